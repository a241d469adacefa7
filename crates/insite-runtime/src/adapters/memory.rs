//! In-memory collaborators.
//!
//! Every adapter reports to a shared [`MemoryProbe`], which counts
//! constructions, injects failures and optionally delays the async ports.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::{
    ConfigSchema, DatabaseOptions, IncomingTransportOptions, Settings, UsersOptions,
};
use crate::error::CollaboratorError;
use crate::ports::*;
use crate::registry::SubsystemId;

const REALTIME_EVENT_CAPACITY: usize = 64;

/// Shared bookkeeping for the in-memory adapters.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    constructed: Mutex<Vec<SubsystemId>>,
    failures: Mutex<HashSet<SubsystemId>>,
    delay: Mutex<Option<Duration>>,
    realtime_servers: Mutex<Vec<Arc<MemoryRealtimeServer>>>,
}

impl MemoryProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the collaborator for `id` fail.
    pub fn fail_on(&self, id: SubsystemId) {
        self.failures.lock().insert(id);
    }

    /// Sleep this long inside every async port before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Times `id` was constructed.
    pub fn constructed(&self, id: SubsystemId) -> usize {
        self.constructed.lock().iter().filter(|c| **c == id).count()
    }

    /// Construction order, one entry per construction.
    pub fn order(&self) -> Vec<SubsystemId> {
        self.constructed.lock().clone()
    }

    /// Real-time servers created so far, oldest first.
    pub fn realtime_servers(&self) -> Vec<Arc<MemoryRealtimeServer>> {
        self.realtime_servers.lock().clone()
    }

    fn record(&self, id: SubsystemId) -> PortResult<()> {
        if self.failures.lock().contains(&id) {
            debug!(subsystem = %id, "Injected failure");
            return Err(CollaboratorError::new(id, "injected failure"));
        }
        self.constructed.lock().push(id);
        Ok(())
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Collaborators {
    /// In-memory collaborators with a private probe.
    pub fn in_memory() -> Self {
        Self::with_probe(MemoryProbe::new())
    }

    /// In-memory collaborators reporting to `probe`.
    pub fn with_probe(probe: Arc<MemoryProbe>) -> Self {
        Self {
            database: Arc::new(MemoryDatabaseConnector(probe.clone())),
            config_store: Arc::new(MemoryConfigStoreLoader(probe.clone())),
            network: Arc::new(MemoryNetworkBinder(probe.clone())),
            realtime: Arc::new(MemoryRealtimeFactory(probe.clone())),
            subscriptions: Arc::new(MemorySubscriptionFactory(probe.clone())),
            transports: Arc::new(MemoryTransportFactory(probe.clone())),
            users: Arc::new(MemoryUsersService(probe.clone())),
            http: Arc::new(MemoryHttpFactory(probe.clone())),
            cookie: Arc::new(MemoryCookieFactory(probe)),
        }
    }
}

// =============================================================================
// DATABASE
// =============================================================================

#[derive(Debug)]
pub struct MemoryClient {
    url: String,
}

impl DatabaseClient for MemoryClient {
    fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug)]
pub struct MemoryDatabase {
    name: String,
}

impl DatabaseHandle for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct MemoryCollections {
    names: Vec<String>,
}

impl Collections for MemoryCollections {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }
}

struct MemoryDatabaseConnector(Arc<MemoryProbe>);

#[async_trait]
impl DatabaseConnector for MemoryDatabaseConnector {
    async fn connect(&self, options: &DatabaseOptions) -> PortResult<DatabaseConnection> {
        self.0.pause().await;
        self.0.record(SubsystemId::Database)?;
        Ok(DatabaseConnection {
            client: Arc::new(MemoryClient {
                url: options.url.clone(),
            }),
            database: Arc::new(MemoryDatabase {
                name: options.name.clone(),
            }),
            collections: Arc::new(MemoryCollections {
                names: options.collections.clone(),
            }),
        })
    }
}

#[derive(Debug)]
pub struct MemoryConfig {
    values: ConfigSchema,
}

impl ConfigHandle for MemoryConfig {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

struct MemoryConfigStoreLoader(Arc<MemoryProbe>);

#[async_trait]
impl ConfigStoreLoader for MemoryConfigStoreLoader {
    async fn init(
        &self,
        _collections: Arc<dyn Collections>,
        schema: &ConfigSchema,
    ) -> PortResult<Arc<dyn ConfigHandle>> {
        self.0.pause().await;
        self.0.record(SubsystemId::ConfigStore)?;
        Ok(Arc::new(MemoryConfig {
            values: schema.clone(),
        }))
    }
}

// =============================================================================
// NETWORK
// =============================================================================

#[derive(Debug)]
pub struct MemoryBinding {
    addr: String,
    tls: bool,
}

impl SharedBinding for MemoryBinding {
    fn local_addr(&self) -> String {
        self.addr.clone()
    }

    fn is_tls(&self) -> bool {
        self.tls
    }
}

struct MemoryNetworkBinder(Arc<MemoryProbe>);

#[async_trait]
impl NetworkBinder for MemoryNetworkBinder {
    async fn bind(&self, options: &BindingOptions) -> PortResult<Arc<dyn SharedBinding>> {
        self.0.pause().await;
        self.0.record(SubsystemId::SharedBinding)?;
        let host = options.host.as_deref().unwrap_or("0.0.0.0");
        Ok(Arc::new(MemoryBinding {
            addr: format!("{host}:{}", options.port),
            tls: options.tls.is_some(),
        }))
    }
}

// =============================================================================
// REAL-TIME
// =============================================================================

/// Real-time server whose lifecycle events are driven by the caller.
#[derive(Debug)]
pub struct MemoryRealtimeServer {
    sender: Mutex<Option<broadcast::Sender<RealtimeEvent>>>,
    shared: bool,
    path: Option<String>,
}

impl MemoryRealtimeServer {
    /// Deliver an event to every `events()` receiver. Returns the receiver count.
    pub fn emit(&self, event: RealtimeEvent) -> usize {
        self.sender
            .lock()
            .as_ref()
            .and_then(|sender| sender.send(event).ok())
            .unwrap_or(0)
    }

    /// Emit `Closed` and close the event channel.
    pub fn close(&self) {
        if let Some(sender) = self.sender.lock().take() {
            let _ = sender.send(RealtimeEvent::Closed);
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl RealtimeServer for MemoryRealtimeServer {
    fn events(&self) -> broadcast::Receiver<RealtimeEvent> {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            // Closed: hand out a receiver that reports closed immediately
            None => broadcast::channel(1).1,
        }
    }

    fn is_shared(&self) -> bool {
        self.shared
    }
}

struct MemoryRealtimeFactory(Arc<MemoryProbe>);

impl RealtimeFactory for MemoryRealtimeFactory {
    fn create(&self, settings: RealtimeSettings) -> PortResult<Arc<dyn RealtimeServer>> {
        self.0.record(SubsystemId::Realtime)?;
        let (sender, _) = broadcast::channel(REALTIME_EVENT_CAPACITY);
        let server = Arc::new(MemoryRealtimeServer {
            sender: Mutex::new(Some(sender)),
            shared: settings.binding.is_some(),
            path: settings.path,
        });
        self.0.realtime_servers.lock().push(server.clone());
        Ok(server)
    }
}

#[derive(Debug)]
pub struct MemoryDispatcher {
    persistent: bool,
}

impl SubscriptionDispatcher for MemoryDispatcher {
    fn is_persistent(&self) -> bool {
        self.persistent
    }
}

struct MemorySubscriptionFactory(Arc<MemoryProbe>);

impl SubscriptionFactory for MemorySubscriptionFactory {
    fn create(
        &self,
        _realtime: Arc<dyn RealtimeServer>,
        persistent: bool,
    ) -> PortResult<Arc<dyn SubscriptionDispatcher>> {
        self.0.record(SubsystemId::Subscriptions)?;
        Ok(Arc::new(MemoryDispatcher { persistent }))
    }
}

#[derive(Debug)]
pub struct MemoryIncomingTransport {
    pub options: IncomingTransportOptions,
}

impl IncomingTransportHandle for MemoryIncomingTransport {}

#[derive(Debug)]
pub struct MemoryOutgoingTransport;

impl OutgoingTransportHandle for MemoryOutgoingTransport {}

struct MemoryTransportFactory(Arc<MemoryProbe>);

impl TransportFactory for MemoryTransportFactory {
    fn incoming(
        &self,
        _realtime: Arc<dyn RealtimeServer>,
        options: &IncomingTransportOptions,
    ) -> PortResult<Arc<dyn IncomingTransportHandle>> {
        self.0.record(SubsystemId::IncomingTransport)?;
        Ok(Arc::new(MemoryIncomingTransport {
            options: options.clone(),
        }))
    }

    fn outgoing(
        &self,
        _realtime: Arc<dyn RealtimeServer>,
    ) -> PortResult<Arc<dyn OutgoingTransportHandle>> {
        self.0.record(SubsystemId::OutgoingTransport)?;
        Ok(Arc::new(MemoryOutgoingTransport))
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug)]
pub struct MemoryUsers {
    name: Option<String>,
}

impl UsersLayer for MemoryUsers {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug)]
pub struct MemoryUsersServer {
    users: Arc<MemoryUsers>,
    public: bool,
}

impl UsersServer for MemoryUsersServer {
    fn users(&self) -> Arc<dyn UsersLayer> {
        self.users.clone()
    }

    fn is_public(&self) -> bool {
        self.public
    }
}

struct MemoryUsersService(Arc<MemoryProbe>);

#[async_trait]
impl UsersService for MemoryUsersService {
    async fn init_users(
        &self,
        _collections: Arc<dyn Collections>,
        options: &UsersOptions,
    ) -> PortResult<Arc<dyn UsersLayer>> {
        self.0.pause().await;
        self.0.record(SubsystemId::Users)?;
        Ok(Arc::new(MemoryUsers {
            name: options.name.clone(),
        }))
    }

    async fn init_server(&self, context: UsersServerContext) -> PortResult<Arc<dyn UsersServer>> {
        self.0.pause().await;
        self.0.record(SubsystemId::UsersServer)?;
        Ok(Arc::new(MemoryUsersServer {
            users: Arc::new(MemoryUsers {
                name: context.users.name,
            }),
            public: context.public,
        }))
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// A named, inert middleware.
#[derive(Debug)]
pub struct NamedMiddleware {
    name: String,
}

impl NamedMiddleware {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into() })
    }
}

impl Middleware for NamedMiddleware {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct MemoryHttpServer {
    middlewares: Vec<Arc<dyn Middleware>>,
    shared: bool,
}

impl HttpServer for MemoryHttpServer {
    fn middleware_names(&self) -> Vec<String> {
        self.middlewares
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    fn is_shared(&self) -> bool {
        self.shared
    }
}

struct MemoryHttpFactory(Arc<MemoryProbe>);

impl HttpFactory for MemoryHttpFactory {
    fn create(
        &self,
        settings: HttpSettings,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> PortResult<Arc<dyn HttpServer>> {
        self.0.record(SubsystemId::Http)?;
        Ok(Arc::new(MemoryHttpServer {
            middlewares,
            shared: settings.binding.is_some(),
        }))
    }

    fn cookie_middleware(&self, _options: &Settings) -> PortResult<Arc<dyn Middleware>> {
        Ok(NamedMiddleware::new("cookie"))
    }

    fn static_middleware(&self, _options: &Settings) -> PortResult<Arc<dyn Middleware>> {
        Ok(NamedMiddleware::new("static"))
    }

    fn template_middleware(&self, _options: &Settings) -> PortResult<Arc<dyn Middleware>> {
        Ok(NamedMiddleware::new("template"))
    }
}

#[derive(Debug)]
pub struct MemoryCookieSetter {
    pub options: Settings,
}

impl CookieSetter for MemoryCookieSetter {}

struct MemoryCookieFactory(Arc<MemoryProbe>);

impl CookieFactory for MemoryCookieFactory {
    fn create(
        &self,
        options: Settings,
        _users_server: Arc<dyn UsersServer>,
    ) -> PortResult<Arc<dyn CookieSetter>> {
        self.0.record(SubsystemId::Cookie)?;
        Ok(Arc::new(MemoryCookieSetter { options }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_counts_and_fails() {
        let probe = MemoryProbe::new();
        let collaborators = Collaborators::with_probe(probe.clone());
        let options = DatabaseOptions::new("mem://", "site");

        collaborators.database.connect(&options).await.unwrap();
        assert_eq!(probe.constructed(SubsystemId::Database), 1);

        probe.fail_on(SubsystemId::Database);
        let err = collaborators.database.connect(&options).await.unwrap_err();
        assert_eq!(err.subsystem, SubsystemId::Database);
        assert_eq!(probe.constructed(SubsystemId::Database), 1);
    }

    #[tokio::test]
    async fn test_realtime_events_close() {
        let probe = MemoryProbe::new();
        let collaborators = Collaborators::with_probe(probe.clone());
        let server = collaborators
            .realtime
            .create(RealtimeSettings::default())
            .unwrap();

        let mut events = server.events();
        let memory = probe.realtime_servers().pop().unwrap();
        assert_eq!(memory.emit(RealtimeEvent::Error("boom".into())), 1);
        memory.close();

        assert_eq!(
            events.recv().await.unwrap(),
            RealtimeEvent::Error("boom".into())
        );
        assert_eq!(events.recv().await.unwrap(), RealtimeEvent::Closed);
        assert!(events.recv().await.is_err());

        // Late subscribers see a closed channel straight away
        assert!(server.events().recv().await.is_err());
    }
}
