//! Ports the builders call to construct each subsystem.

use std::sync::Arc;

use async_trait::async_trait;

use super::handles::*;
use crate::config::{
    ConfigSchema, DatabaseOptions, IncomingTransportOptions, Settings, TlsOptions, UsersOptions,
    UsersServerOptions,
};
use crate::error::CollaboratorError;

/// Result type for all collaborator ports.
pub type PortResult<T> = Result<T, CollaboratorError>;

#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn connect(&self, options: &DatabaseOptions) -> PortResult<DatabaseConnection>;
}

#[async_trait]
pub trait ConfigStoreLoader: Send + Sync {
    async fn init(
        &self,
        collections: Arc<dyn Collections>,
        schema: &ConfigSchema,
    ) -> PortResult<Arc<dyn ConfigHandle>>;
}

/// Where the shared binding listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOptions {
    pub host: Option<String>,
    pub port: u16,
    pub tls: Option<TlsOptions>,
}

#[async_trait]
pub trait NetworkBinder: Send + Sync {
    async fn bind(&self, options: &BindingOptions) -> PortResult<Arc<dyn SharedBinding>>;
}

/// Arguments for the real-time server, after global/local merging.
#[derive(Debug, Clone, Default)]
pub struct RealtimeSettings {
    /// Set when a shared binding was built; the server then ignores `port`.
    pub binding: Option<Arc<dyn SharedBinding>>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub tls: Option<TlsOptions>,
    pub extra: Settings,
}

pub trait RealtimeFactory: Send + Sync {
    fn create(&self, settings: RealtimeSettings) -> PortResult<Arc<dyn RealtimeServer>>;
}

pub trait SubscriptionFactory: Send + Sync {
    fn create(
        &self,
        realtime: Arc<dyn RealtimeServer>,
        persistent: bool,
    ) -> PortResult<Arc<dyn SubscriptionDispatcher>>;
}

pub trait TransportFactory: Send + Sync {
    fn incoming(
        &self,
        realtime: Arc<dyn RealtimeServer>,
        options: &IncomingTransportOptions,
    ) -> PortResult<Arc<dyn IncomingTransportHandle>>;

    fn outgoing(
        &self,
        realtime: Arc<dyn RealtimeServer>,
    ) -> PortResult<Arc<dyn OutgoingTransportHandle>>;
}

/// Everything the networked users server is built from.
#[derive(Debug, Clone)]
pub struct UsersServerContext {
    pub realtime: Arc<dyn RealtimeServer>,
    pub collections: Arc<dyn Collections>,
    pub incoming_transport: Option<Arc<dyn IncomingTransportHandle>>,
    /// Users layer settings, without `server`.
    pub users: UsersOptions,
    pub server: UsersServerOptions,
    pub public: bool,
}

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn init_users(
        &self,
        collections: Arc<dyn Collections>,
        options: &UsersOptions,
    ) -> PortResult<Arc<dyn UsersLayer>>;

    async fn init_server(&self, context: UsersServerContext) -> PortResult<Arc<dyn UsersServer>>;
}

/// Arguments for the HTTP server, after global/local merging.
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    /// Set when a shared binding was built; the server then ignores `port`.
    pub binding: Option<Arc<dyn SharedBinding>>,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub tls: Option<TlsOptions>,
    pub extra: Settings,
}

pub trait HttpFactory: Send + Sync {
    fn create(
        &self,
        settings: HttpSettings,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> PortResult<Arc<dyn HttpServer>>;

    fn cookie_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>>;

    fn static_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>>;

    fn template_middleware(&self, options: &Settings) -> PortResult<Arc<dyn Middleware>>;
}

pub trait CookieFactory: Send + Sync {
    fn create(
        &self,
        options: Settings,
        users_server: Arc<dyn UsersServer>,
    ) -> PortResult<Arc<dyn CookieSetter>>;
}

/// One implementation per port.
#[derive(Clone)]
pub struct Collaborators {
    pub database: Arc<dyn DatabaseConnector>,
    pub config_store: Arc<dyn ConfigStoreLoader>,
    pub network: Arc<dyn NetworkBinder>,
    pub realtime: Arc<dyn RealtimeFactory>,
    pub subscriptions: Arc<dyn SubscriptionFactory>,
    pub transports: Arc<dyn TransportFactory>,
    pub users: Arc<dyn UsersService>,
    pub http: Arc<dyn HttpFactory>,
    pub cookie: Arc<dyn CookieFactory>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
