//! # Lifecycle Flows
//!
//! A site's lifecycle as seen from outside: events on insite-bus and
//! counters in insite-telemetry.
//!
//! ## Flows Tested:
//!
//! 1. **Build → Bus**: one `SubsystemBuilt` per subsystem, then `SiteReady`
//! 2. **Failure → Bus**: `SiteFailed` names the failing subsystem
//! 3. **Real-time → Bus + Metrics**: server events republished and counted

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;
    use tokio_stream::StreamExt;
    use uuid::Uuid;

    use insite_bus::{EventFilter, EventTopic, SiteEvent};
    use insite_runtime::adapters::MemoryProbe;
    use insite_runtime::ports::RealtimeEvent;
    use insite_runtime::{Collaborators, Site, SiteOptions, SubsystemId};
    use insite_telemetry::{gather_text, register_metrics, REALTIME_CONNECTIONS, REALTIME_ERRORS};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const FULL: &str = r#"{
        "database": {"url": "mongodb://localhost", "name": "flows"},
        "network": {"port": 7070},
        "realtime": {},
        "users": {"server": {}},
        "http": true
    }"#;

    fn site(json: &str, probe: &Arc<MemoryProbe>) -> Arc<Site> {
        let options = SiteOptions::from_json_str(json).expect("valid options");
        Site::new(options, Collaborators::with_probe(probe.clone()))
    }

    // =============================================================================
    // BUILD → BUS
    // =============================================================================

    #[tokio::test]
    async fn test_build_events_stream_until_ready() {
        let probe = MemoryProbe::new();
        let site = site(FULL, &probe);
        let mut stream = site
            .events()
            .event_stream(EventFilter::topics(vec![EventTopic::Lifecycle]));

        let runner = Arc::clone(&site);
        tokio::spawn(async move { runner.initialize().await });

        let mut built = Vec::new();
        loop {
            let event = timeout(Duration::from_secs(1), stream.next())
                .await
                .expect("lifecycle event within timeout")
                .expect("bus open");
            match event {
                SiteEvent::SubsystemBuilt { subsystem, .. } => built.push(subsystem),
                SiteEvent::SiteReady { built: mut ready } => {
                    let mut seen = built.clone();
                    seen.sort();
                    ready.sort();
                    assert_eq!(seen, ready);
                    break;
                }
                other => panic!("unexpected lifecycle event: {other:?}"),
            }
        }

        // Lanes may finish in either order; everything after is sequential
        assert_eq!(
            &built[2..],
            [
                "realtime",
                "subscriptions",
                "incoming_transport",
                "users_server",
                "users",
                "http",
                "cookie"
            ]
        );
        assert!(built[..2].contains(&"database".to_string()));
        assert!(built[..2].contains(&"binding".to_string()));
    }

    #[tokio::test]
    async fn test_failure_event_names_subsystem() {
        let probe = MemoryProbe::new();
        probe.fail_on(SubsystemId::Http);
        let site = site(FULL, &probe);
        let mut events = site.events().subscribe(EventFilter::for_subsystems(["http"]));

        assert!(site.initialize().await.is_err());

        let event = events.try_recv().unwrap().expect("failure published");
        match event {
            SiteEvent::SiteFailed { subsystem, error } => {
                assert_eq!(subsystem, "http");
                assert_eq!(error, "http failed: injected failure");
            }
            other => panic!("expected SiteFailed, got {other:?}"),
        }
    }

    // =============================================================================
    // REAL-TIME → BUS + METRICS
    // =============================================================================

    #[tokio::test]
    async fn test_realtime_events_are_counted() {
        register_metrics().unwrap();
        let probe = MemoryProbe::new();
        let site = site(r#"{"realtime": {}}"#, &probe);
        site.initialize().await.unwrap();

        let mut events = site.events().subscribe(EventFilter::topics(vec![EventTopic::Realtime]));
        let connections = REALTIME_CONNECTIONS.get();
        let errors = REALTIME_ERRORS.get();

        let server = probe.realtime_servers().pop().expect("server created");
        server.emit(RealtimeEvent::Connected {
            connection_id: Uuid::new_v4(),
            user: None,
        });
        server.emit(RealtimeEvent::Error("reset".into()));

        for _ in 0..2 {
            timeout(Duration::from_millis(500), events.recv())
                .await
                .expect("event forwarded")
                .expect("bus open");
        }

        // Other tests share the global counters: at least ours landed
        assert!(REALTIME_CONNECTIONS.get() >= connections + 1.0);
        assert!(REALTIME_ERRORS.get() >= errors + 1.0);

        let text = gather_text().unwrap();
        assert!(text.contains("insite_subsystems_built_total"));
        assert!(text.contains(r#"subsystem="realtime""#));
    }

    #[tokio::test]
    async fn test_watcher_stops_after_close() {
        let probe = MemoryProbe::new();
        let site = site(r#"{"realtime": {}}"#, &probe);
        site.initialize().await.unwrap();

        let mut events = site.events().subscribe(EventFilter::topics(vec![EventTopic::Realtime]));
        let server = probe.realtime_servers().pop().expect("server created");
        server.close();

        let closed = timeout(Duration::from_millis(500), events.recv())
            .await
            .expect("close forwarded");
        assert_eq!(closed, Some(SiteEvent::RealtimeClosed));

        // Nothing more arrives once the channel is gone
        assert_eq!(server.emit(RealtimeEvent::Error("late".into())), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(events.try_recv().unwrap().is_none());
    }
}
