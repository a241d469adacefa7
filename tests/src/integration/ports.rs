//! # Custom Collaborators
//!
//! Swapping individual ports and checking what the builders hand them:
//! merged settings, shared bindings, and the users server context.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use insite_runtime::adapters::MemoryProbe;
    use insite_runtime::config::{Settings, TlsOptions, UsersOptions};
    use insite_runtime::ports::{
        BindingOptions, Collections, HttpFactory, HttpServer, HttpSettings, Middleware,
        NetworkBinder, PortResult, RealtimeFactory, RealtimeServer, RealtimeSettings,
        SharedBinding, UsersLayer, UsersServer, UsersServerContext, UsersService,
    };
    use insite_runtime::{CollaboratorError, Collaborators, Site, SiteOptions, SubsystemId};

    // =============================================================================
    // RECORDING ADAPTERS
    // =============================================================================

    /// Wraps the in-memory collaborators and records what each port saw.
    #[derive(Default)]
    struct Recorder {
        binding: Mutex<Option<BindingOptions>>,
        realtime: Mutex<Option<RealtimeSettings>>,
        http: Mutex<Option<HttpSettings>>,
        users_context: Mutex<Option<UsersServerContext>>,
    }

    struct RecordingBinder(Arc<Recorder>, Arc<dyn NetworkBinder>);

    #[async_trait]
    impl NetworkBinder for RecordingBinder {
        async fn bind(&self, options: &BindingOptions) -> PortResult<Arc<dyn SharedBinding>> {
            *self.0.binding.lock() = Some(options.clone());
            self.1.bind(options).await
        }
    }

    struct RecordingRealtime(Arc<Recorder>, Arc<dyn RealtimeFactory>);

    impl RealtimeFactory for RecordingRealtime {
        fn create(&self, settings: RealtimeSettings) -> PortResult<Arc<dyn RealtimeServer>> {
            *self.0.realtime.lock() = Some(settings.clone());
            self.1.create(settings)
        }
    }

    struct RecordingHttp(Arc<Recorder>, Arc<dyn HttpFactory>);

    impl HttpFactory for RecordingHttp {
        fn create(
            &self,
            settings: HttpSettings,
            middlewares: Vec<Arc<dyn Middleware>>,
        ) -> PortResult<Arc<dyn HttpServer>> {
            *self.0.http.lock() = Some(settings.clone());
            self.1.create(settings, middlewares)
        }

        fn cookie_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>> {
            self.1.cookie_middleware(options)
        }

        fn static_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>> {
            self.1.static_middleware(options)
        }

        fn template_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>> {
            self.1.template_middleware(options)
        }
    }

    struct RecordingUsers(Arc<Recorder>, Arc<dyn UsersService>);

    #[async_trait]
    impl UsersService for RecordingUsers {
        async fn init_users(
            &self,
            collections: Arc<dyn Collections>,
            options: &UsersOptions,
        ) -> PortResult<Arc<dyn UsersLayer>> {
            self.1.init_users(collections, options).await
        }

        async fn init_server(
            &self,
            context: UsersServerContext,
        ) -> PortResult<Arc<dyn UsersServer>> {
            *self.0.users_context.lock() = Some(context.clone());
            self.1.init_server(context).await
        }
    }

    fn recording() -> (Collaborators, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let base = Collaborators::with_probe(MemoryProbe::new());
        let collaborators = Collaborators {
            network: Arc::new(RecordingBinder(recorder.clone(), base.network.clone())),
            realtime: Arc::new(RecordingRealtime(recorder.clone(), base.realtime.clone())),
            http: Arc::new(RecordingHttp(recorder.clone(), base.http.clone())),
            users: Arc::new(RecordingUsers(recorder.clone(), base.users.clone())),
            ..base
        };
        (collaborators, recorder)
    }

    fn tls(name: &str) -> TlsOptions {
        TlsOptions {
            cert: format!("{name}.crt"),
            key: format!("{name}.key"),
        }
    }

    // =============================================================================
    // SETTINGS MERGING
    // =============================================================================

    #[tokio::test]
    async fn test_global_tls_and_host_merge_into_servers() {
        let (collaborators, recorder) = recording();
        let options = SiteOptions::from_json_str(
            r#"{
                "network": {"host": "10.0.0.1", "tls": {"cert": "global.crt", "key": "global.key"}},
                "realtime": {"port": 9001, "path": "/live"},
                "http": {"port": 9002, "tls": {"cert": "http.crt", "key": "http.key"}}
            }"#,
        )
        .unwrap();

        Site::init(options, collaborators).await.unwrap();

        // No port, so no shared binding
        assert!(recorder.binding.lock().is_none());

        let realtime = recorder.realtime.lock().clone().unwrap();
        assert!(realtime.binding.is_none());
        assert_eq!(realtime.port, Some(9001));
        assert_eq!(realtime.path.as_deref(), Some("/live"));
        assert_eq!(realtime.tls, Some(tls("global")));

        let http = recorder.http.lock().clone().unwrap();
        assert_eq!(http.port, Some(9002));
        assert_eq!(http.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(http.tls, Some(tls("http")), "local TLS wins");
    }

    #[tokio::test]
    async fn test_shared_binding_handed_to_both_servers() {
        let (collaborators, recorder) = recording();
        let options = SiteOptions::from_json_str(
            r#"{"network": {"host": "127.0.0.1", "port": "8443"}, "realtime": {}, "http": true}"#,
        )
        .unwrap();

        let site = Site::init(options, collaborators).await.unwrap();

        let binding = recorder.binding.lock().clone().unwrap();
        assert_eq!(binding.port, 8443);
        assert_eq!(binding.host.as_deref(), Some("127.0.0.1"));

        let shared = site.binding().unwrap();
        let realtime = recorder.realtime.lock().clone().unwrap();
        let http = recorder.http.lock().clone().unwrap();
        assert!(Arc::ptr_eq(&realtime.binding.unwrap(), &shared));
        assert!(Arc::ptr_eq(&http.binding.unwrap(), &shared));
    }

    #[tokio::test]
    async fn test_users_server_context() {
        let (collaborators, recorder) = recording();
        let options = SiteOptions::from_json_str(
            r#"{
                "database": {"url": "mongodb://localhost", "name": "ctx"},
                "realtime": {"incomingTransport": {"maxPayload": 1024}},
                "users": {"name": "members", "server": {"login": "/login"}},
                "public": true
            }"#,
        )
        .unwrap();

        let site = Site::init(options, collaborators).await.unwrap();

        let context = recorder.users_context.lock().clone().unwrap();
        assert!(context.public);
        assert!(context.incoming_transport.is_some());
        assert_eq!(context.users.name.as_deref(), Some("members"));
        assert!(context.users.server.is_none(), "server settings travel separately");
        assert_eq!(
            context.server.settings.get("login"),
            Some(&serde_json::json!("/login"))
        );
        assert!(Arc::ptr_eq(&context.realtime, &site.realtime().unwrap()));
    }

    // =============================================================================
    // FAILING PORT
    // =============================================================================

    struct RefusingBinder;

    #[async_trait]
    impl NetworkBinder for RefusingBinder {
        async fn bind(&self, options: &BindingOptions) -> PortResult<Arc<dyn SharedBinding>> {
            Err(CollaboratorError::new(
                SubsystemId::SharedBinding,
                format!("port {} in use", options.port),
            ))
        }
    }

    #[tokio::test]
    async fn test_binding_failure_aborts_before_servers() {
        let probe = MemoryProbe::new();
        let collaborators = Collaborators {
            network: Arc::new(RefusingBinder),
            ..Collaborators::with_probe(probe.clone())
        };
        let options = SiteOptions::from_json_str(
            r#"{"database": {"url": "mongodb://localhost", "name": "x"}, "network": {"port": 80}, "http": true}"#,
        )
        .unwrap();

        let err = Site::init(options, collaborators).await.unwrap_err();

        assert_eq!(err.to_string(), "binding failed: port 80 in use");
        assert_eq!(probe.constructed(SubsystemId::Http), 0);
    }
}
