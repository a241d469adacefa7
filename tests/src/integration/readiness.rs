//! # Readiness
//!
//! Settle-once readiness under concurrent callers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use insite_runtime::adapters::MemoryProbe;
    use insite_runtime::{Collaborators, InitStatus, Site, SiteOptions, SubsystemId, SubsystemStatus};

    const OPTIONS: &str = r#"{
        "database": {"url": "mongodb://localhost", "name": "ready"},
        "configStore": {"theme": "dark"},
        "realtime": {},
        "users": {},
        "http": true
    }"#;

    fn options() -> SiteOptions {
        SiteOptions::from_json_str(OPTIONS).expect("valid options")
    }

    #[tokio::test]
    async fn test_many_waiters_share_one_build() {
        let probe = MemoryProbe::new();
        probe.set_delay(Duration::from_millis(10));
        let site = Site::launch(options(), Collaborators::with_probe(probe.clone()));

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let site = Arc::clone(&site);
                tokio::spawn(async move { site.when_ready().await })
            })
            .collect();

        let mut snapshots = Vec::new();
        for waiter in waiters {
            let ready = timeout(Duration::from_secs(1), waiter)
                .await
                .expect("readiness within timeout")
                .expect("waiter task")
                .expect("site ready");
            snapshots.push(ready.components().expect("components after ready"));
        }

        assert!(snapshots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        for id in probe.order() {
            assert_eq!(probe.constructed(id), 1, "{id} built more than once");
        }
    }

    #[tokio::test]
    async fn test_spawned_initializers_race() {
        let probe = MemoryProbe::new();
        probe.set_delay(Duration::from_millis(5));
        let site = Site::new(options(), Collaborators::with_probe(probe.clone()));

        let racers: Vec<_> = (0..4)
            .map(|_| {
                let site = Arc::clone(&site);
                tokio::spawn(async move { site.initialize().await })
            })
            .collect();
        for racer in racers {
            racer.await.unwrap().unwrap();
        }

        site.when_ready().await.unwrap();
        assert_eq!(site.status(), InitStatus::Ready);
        assert_eq!(probe.constructed(SubsystemId::Database), 1);
        assert_eq!(probe.constructed(SubsystemId::ConfigStore), 1);
        assert_eq!(probe.constructed(SubsystemId::Realtime), 1);
    }

    #[tokio::test]
    async fn test_registry_tracks_outcome() {
        let probe = MemoryProbe::new();
        let site = Site::new(options(), Collaborators::with_probe(probe));
        assert_eq!(
            site.registry().get_status(SubsystemId::Http),
            SubsystemStatus::Pending
        );
        assert_eq!(
            site.registry().get_status(SubsystemId::Cookie),
            SubsystemStatus::NotRequested
        );

        site.initialize().await.unwrap();

        assert_eq!(
            site.registry().get_status(SubsystemId::Http),
            SubsystemStatus::Built
        );
        assert_eq!(site.registry().built(), site.built());
    }

    #[tokio::test]
    async fn test_waiting_does_not_start_initialization() {
        let probe = MemoryProbe::new();
        let site = Site::new(options(), Collaborators::with_probe(probe.clone()));

        let pending = timeout(Duration::from_millis(50), site.when_ready()).await;
        assert!(pending.is_err(), "nothing settles before initialize");
        assert!(probe.order().is_empty());
        assert_eq!(site.status(), InitStatus::NotStarted);
    }
}
