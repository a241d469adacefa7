//! Opaque handles to built subsystems.
//!
//! The site only stores and forwards these; what a handle can do beyond the
//! few introspection methods here is the collaborator's business.

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Database driver client.
pub trait DatabaseClient: Debug + Send + Sync {
    fn url(&self) -> &str;
}

/// Handle to one named database.
pub trait DatabaseHandle: Debug + Send + Sync {
    fn name(&self) -> &str;
}

/// The collections a connection exposes.
pub trait Collections: Debug + Send + Sync {
    fn names(&self) -> Vec<String>;
}

/// Everything a database connection yields.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pub client: Arc<dyn DatabaseClient>,
    pub database: Arc<dyn DatabaseHandle>,
    pub collections: Arc<dyn Collections>,
}

/// Configuration store backed by the database.
pub trait ConfigHandle: Debug + Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

/// Listening socket shared by the real-time and HTTP servers.
pub trait SharedBinding: Debug + Send + Sync {
    fn local_addr(&self) -> String;
    fn is_tls(&self) -> bool;
}

/// Lifecycle events of a real-time server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    Connected {
        connection_id: Uuid,
        /// Email of the session's user, if authenticated.
        user: Option<String>,
    },
    Error(String),
    Closed,
}

/// Real-time connection server.
pub trait RealtimeServer: Debug + Send + Sync {
    /// Subscribe to lifecycle events. The channel closes with the server.
    fn events(&self) -> broadcast::Receiver<RealtimeEvent>;

    /// Whether it listens on a shared binding rather than its own port.
    fn is_shared(&self) -> bool;
}

/// Dispatcher for data subscriptions over the real-time server.
pub trait SubscriptionDispatcher: Debug + Send + Sync {
    /// Publishing is backed by the database.
    fn is_persistent(&self) -> bool;
}

pub trait IncomingTransportHandle: Debug + Send + Sync {}

pub trait OutgoingTransportHandle: Debug + Send + Sync {}

/// Users/authentication layer.
pub trait UsersLayer: Debug + Send + Sync {
    fn name(&self) -> Option<&str>;
}

/// Users layer exposed over the real-time server.
pub trait UsersServer: Debug + Send + Sync {
    /// The users layer this server owns.
    fn users(&self) -> Arc<dyn UsersLayer>;
    fn is_public(&self) -> bool;
}

/// One stage of the HTTP pipeline.
pub trait Middleware: Debug + Send + Sync {
    fn name(&self) -> &str;
}

pub trait HttpServer: Debug + Send + Sync {
    /// Mounted middleware names, in order.
    fn middleware_names(&self) -> Vec<String>;
    fn is_shared(&self) -> bool;
}

/// Issues session cookies for the users server.
pub trait CookieSetter: Debug + Send + Sync {}
