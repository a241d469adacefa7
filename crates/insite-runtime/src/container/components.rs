//! The set of handles a site has built.

use std::sync::Arc;

use crate::ports::*;
use crate::registry::SubsystemId;

/// Which users layer a site ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersVariant {
    /// Built directly over the database collections.
    Plain,
    /// Owned by the networked users server.
    Networked,
}

/// Built subsystems, one optional slot per field name.
///
/// Only the builders write these; everyone else goes through the accessors.
#[derive(Debug, Clone, Default)]
pub struct SiteComponents {
    pub(crate) client: Option<Arc<dyn DatabaseClient>>,
    pub(crate) database: Option<Arc<dyn DatabaseHandle>>,
    pub(crate) collections: Option<Arc<dyn Collections>>,
    pub(crate) config: Option<Arc<dyn ConfigHandle>>,
    pub(crate) binding: Option<Arc<dyn SharedBinding>>,
    pub(crate) realtime: Option<Arc<dyn RealtimeServer>>,
    pub(crate) subscriptions: Option<Arc<dyn SubscriptionDispatcher>>,
    pub(crate) incoming_transport: Option<Arc<dyn IncomingTransportHandle>>,
    pub(crate) outgoing_transport: Option<Arc<dyn OutgoingTransportHandle>>,
    pub(crate) users: Option<Arc<dyn UsersLayer>>,
    pub(crate) users_server: Option<Arc<dyn UsersServer>>,
    pub(crate) http: Option<Arc<dyn HttpServer>>,
    pub(crate) cookie: Option<Arc<dyn CookieSetter>>,
}

impl SiteComponents {
    pub(crate) fn attach_database(&mut self, connection: DatabaseConnection) {
        self.client = Some(connection.client);
        self.database = Some(connection.database);
        self.collections = Some(connection.collections);
    }

    pub(crate) fn attach_users_server(&mut self, server: Arc<dyn UsersServer>) {
        self.users = Some(server.users());
        self.users_server = Some(server);
    }

    /// Take every slot `other` filled. Lanes never fill the same slot.
    pub(crate) fn merge(&mut self, other: SiteComponents) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        take!(
            client,
            database,
            collections,
            config,
            binding,
            realtime,
            subscriptions,
            incoming_transport,
            outgoing_transport,
            users,
            users_server,
            http,
            cookie
        );
    }

    /// Whether the subsystem's field is populated.
    #[must_use]
    pub fn has(&self, id: SubsystemId) -> bool {
        match id {
            SubsystemId::Database => self.client.is_some(),
            SubsystemId::ConfigStore => self.config.is_some(),
            SubsystemId::SharedBinding => self.binding.is_some(),
            SubsystemId::Realtime => self.realtime.is_some(),
            SubsystemId::Subscriptions => self.subscriptions.is_some(),
            SubsystemId::IncomingTransport => self.incoming_transport.is_some(),
            SubsystemId::OutgoingTransport => self.outgoing_transport.is_some(),
            SubsystemId::Users => self.users.is_some(),
            SubsystemId::UsersServer => self.users_server.is_some(),
            SubsystemId::Http => self.http.is_some(),
            SubsystemId::Cookie => self.cookie.is_some(),
        }
    }

    /// Populated fields, in build order.
    #[must_use]
    pub fn built(&self) -> Vec<SubsystemId> {
        SubsystemId::all()
            .into_iter()
            .filter(|id| self.has(*id))
            .collect()
    }

    #[must_use]
    pub fn users_variant(&self) -> Option<UsersVariant> {
        match (&self.users, &self.users_server) {
            (Some(_), Some(_)) => Some(UsersVariant::Networked),
            (Some(_), None) => Some(UsersVariant::Plain),
            (None, _) => None,
        }
    }

    // =========================================================================
    // ACCESSOR METHODS
    // =========================================================================

    pub fn client(&self) -> Option<Arc<dyn DatabaseClient>> {
        self.client.clone()
    }

    pub fn database(&self) -> Option<Arc<dyn DatabaseHandle>> {
        self.database.clone()
    }

    pub fn collections(&self) -> Option<Arc<dyn Collections>> {
        self.collections.clone()
    }

    pub fn config(&self) -> Option<Arc<dyn ConfigHandle>> {
        self.config.clone()
    }

    pub fn binding(&self) -> Option<Arc<dyn SharedBinding>> {
        self.binding.clone()
    }

    pub fn realtime(&self) -> Option<Arc<dyn RealtimeServer>> {
        self.realtime.clone()
    }

    pub fn subscriptions(&self) -> Option<Arc<dyn SubscriptionDispatcher>> {
        self.subscriptions.clone()
    }

    pub fn incoming_transport(&self) -> Option<Arc<dyn IncomingTransportHandle>> {
        self.incoming_transport.clone()
    }

    pub fn outgoing_transport(&self) -> Option<Arc<dyn OutgoingTransportHandle>> {
        self.outgoing_transport.clone()
    }

    pub fn users(&self) -> Option<Arc<dyn UsersLayer>> {
        self.users.clone()
    }

    pub fn users_server(&self) -> Option<Arc<dyn UsersServer>> {
        self.users_server.clone()
    }

    pub fn http(&self) -> Option<Arc<dyn HttpServer>> {
        self.http.clone()
    }

    pub fn cookie(&self) -> Option<Arc<dyn CookieSetter>> {
        self.cookie.clone()
    }
}
