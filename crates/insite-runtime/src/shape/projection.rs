//! From configuration shape to result shape.

use std::sync::Arc;

use super::builder::Shape;
use super::flags::{And, Flag, Not, Or, Toggle, Yes};
use crate::container::Site;
use crate::error::SiteError;
use crate::ports::*;
use crate::registry::SubsystemId;

/// The configuration-side flags of a shape.
pub trait ConfigShape {
    type Database: Flag;
    type ConfigStore: Flag;
    type Port: Flag;
    type Realtime: Flag;
    type SubscriptionsOff: Flag;
    type IncomingRequested: Flag;
    type IncomingOff: Flag;
    type Outgoing: Flag;
    type Users: Flag;
    type UsersServer: Flag;
    type Http: Flag;
    type CookieOff: Flag;
}

impl<D, C, P, R, S, I, O, U, V, H, K> ConfigShape for Shape<D, C, P, R, S, I, O, U, V, H, K>
where
    D: Flag,
    C: Flag,
    P: Flag,
    R: Flag,
    S: Toggle,
    I: Toggle,
    O: Flag,
    U: Flag,
    V: Flag,
    H: Flag,
    K: Toggle,
{
    type Database = D;
    type ConfigStore = C;
    type Port = P;
    type Realtime = R;
    type SubscriptionsOff = S::IsDisabled;
    type IncomingRequested = I::IsRequested;
    type IncomingOff = I::IsDisabled;
    type Outgoing = O;
    type Users = U;
    type UsersServer = V;
    type Http = H;
    type CookieOff = K::IsDisabled;
}

/// Which result fields a shape guarantees.
///
/// Derived from [`ConfigShape`] by the same rules the resolver applies at
/// runtime.
pub trait Projection: ConfigShape {
    type HasDatabase: Flag;
    type HasConfig: Flag;
    type HasBinding: Flag;
    type HasRealtime: Flag;
    type HasSubscriptions: Flag;
    type HasIncomingTransport: Flag;
    type HasOutgoingTransport: Flag;
    type HasUsers: Flag;
    type HasUsersServer: Flag;
    type HasHttp: Flag;
    type HasCookie: Flag;
}

impl<S: ConfigShape> Projection for S {
    type HasDatabase = S::Database;
    type HasConfig = And<S::Database, S::ConfigStore>;
    type HasBinding = And<Or<S::Realtime, S::Http>, S::Port>;
    type HasRealtime = S::Realtime;
    type HasSubscriptions = And<S::Realtime, Not<S::SubscriptionsOff>>;
    type HasIncomingTransport = And<
        And<S::Realtime, Not<S::IncomingOff>>,
        Or<S::IncomingRequested, And<S::Database, S::Users>>,
    >;
    type HasOutgoingTransport = And<S::Realtime, S::Outgoing>;
    type HasUsers = And<S::Database, S::Users>;
    type HasUsersServer = And<
        And<And<S::Database, S::Users>, S::UsersServer>,
        And<S::Realtime, Not<S::SubscriptionsOff>>,
    >;
    type HasHttp = S::Http;
    type HasCookie = And<
        Not<S::CookieOff>,
        And<
            And<
                And<And<S::Database, S::Users>, S::UsersServer>,
                And<S::Realtime, Not<S::SubscriptionsOff>>,
            >,
            S::Http,
        >,
    >;
}

type Slot<F, T> = <F as Flag>::Slot<T>;

/// A ready site whose guaranteed fields are reachable without `Option`.
///
/// Accessors exist only for fields the shape guarantees; asking for any
/// other field is a compile error.
pub struct Shaped<S: Projection> {
    site: Arc<Site>,
    client: Slot<S::HasDatabase, Arc<dyn DatabaseClient>>,
    database: Slot<S::HasDatabase, Arc<dyn DatabaseHandle>>,
    collections: Slot<S::HasDatabase, Arc<dyn Collections>>,
    config: Slot<S::HasConfig, Arc<dyn ConfigHandle>>,
    binding: Slot<S::HasBinding, Arc<dyn SharedBinding>>,
    realtime: Slot<S::HasRealtime, Arc<dyn RealtimeServer>>,
    subscriptions: Slot<S::HasSubscriptions, Arc<dyn SubscriptionDispatcher>>,
    incoming_transport: Slot<S::HasIncomingTransport, Arc<dyn IncomingTransportHandle>>,
    outgoing_transport: Slot<S::HasOutgoingTransport, Arc<dyn OutgoingTransportHandle>>,
    users: Slot<S::HasUsers, Arc<dyn UsersLayer>>,
    users_server: Slot<S::HasUsersServer, Arc<dyn UsersServer>>,
    http: Slot<S::HasHttp, Arc<dyn HttpServer>>,
    cookie: Slot<S::HasCookie, Arc<dyn CookieSetter>>,
}

fn fill<F: Flag, T>(subsystem: SubsystemId, value: Option<T>) -> Result<F::Slot<T>, SiteError> {
    F::fill(value).ok_or(SiteError::ShapeMismatch {
        subsystem,
        expected: F::ON,
    })
}

impl<S: Projection> Shaped<S> {
    /// Wait for `site` and check every field against the projection.
    pub async fn project(site: Arc<Site>) -> Result<Self, SiteError> {
        let components = site
            .when_ready()
            .await?
            .components()
            .ok_or(SiteError::ReadinessClosed)?;

        Ok(Self {
            client: fill::<S::HasDatabase, _>(SubsystemId::Database, components.client())?,
            database: fill::<S::HasDatabase, _>(SubsystemId::Database, components.database())?,
            collections: fill::<S::HasDatabase, _>(
                SubsystemId::Database,
                components.collections(),
            )?,
            config: fill::<S::HasConfig, _>(SubsystemId::ConfigStore, components.config())?,
            binding: fill::<S::HasBinding, _>(SubsystemId::SharedBinding, components.binding())?,
            realtime: fill::<S::HasRealtime, _>(SubsystemId::Realtime, components.realtime())?,
            subscriptions: fill::<S::HasSubscriptions, _>(
                SubsystemId::Subscriptions,
                components.subscriptions(),
            )?,
            incoming_transport: fill::<S::HasIncomingTransport, _>(
                SubsystemId::IncomingTransport,
                components.incoming_transport(),
            )?,
            outgoing_transport: fill::<S::HasOutgoingTransport, _>(
                SubsystemId::OutgoingTransport,
                components.outgoing_transport(),
            )?,
            users: fill::<S::HasUsers, _>(SubsystemId::Users, components.users())?,
            users_server: fill::<S::HasUsersServer, _>(
                SubsystemId::UsersServer,
                components.users_server(),
            )?,
            http: fill::<S::HasHttp, _>(SubsystemId::Http, components.http())?,
            cookie: fill::<S::HasCookie, _>(SubsystemId::Cookie, components.cookie())?,
            site,
        })
    }

    pub fn site(&self) -> &Arc<Site> {
        &self.site
    }

    pub fn into_site(self) -> Arc<Site> {
        self.site
    }
}

impl<S: Projection> std::fmt::Debug for Shaped<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shaped").field("site", &self.site).finish()
    }
}

// =============================================================================
// GUARANTEED ACCESSORS
// =============================================================================

impl<S: Projection<HasDatabase = Yes>> Shaped<S> {
    pub fn client(&self) -> &Arc<dyn DatabaseClient> {
        &self.client
    }

    pub fn database(&self) -> &Arc<dyn DatabaseHandle> {
        &self.database
    }

    pub fn collections(&self) -> &Arc<dyn Collections> {
        &self.collections
    }
}

impl<S: Projection<HasConfig = Yes>> Shaped<S> {
    pub fn config(&self) -> &Arc<dyn ConfigHandle> {
        &self.config
    }
}

impl<S: Projection<HasBinding = Yes>> Shaped<S> {
    pub fn binding(&self) -> &Arc<dyn SharedBinding> {
        &self.binding
    }
}

impl<S: Projection<HasRealtime = Yes>> Shaped<S> {
    pub fn realtime(&self) -> &Arc<dyn RealtimeServer> {
        &self.realtime
    }
}

impl<S: Projection<HasSubscriptions = Yes>> Shaped<S> {
    pub fn subscriptions(&self) -> &Arc<dyn SubscriptionDispatcher> {
        &self.subscriptions
    }
}

impl<S: Projection<HasIncomingTransport = Yes>> Shaped<S> {
    pub fn incoming_transport(&self) -> &Arc<dyn IncomingTransportHandle> {
        &self.incoming_transport
    }
}

impl<S: Projection<HasOutgoingTransport = Yes>> Shaped<S> {
    pub fn outgoing_transport(&self) -> &Arc<dyn OutgoingTransportHandle> {
        &self.outgoing_transport
    }
}

impl<S: Projection<HasUsers = Yes>> Shaped<S> {
    pub fn users(&self) -> &Arc<dyn UsersLayer> {
        &self.users
    }
}

impl<S: Projection<HasUsersServer = Yes>> Shaped<S> {
    pub fn users_server(&self) -> &Arc<dyn UsersServer> {
        &self.users_server
    }
}

impl<S: Projection<HasHttp = Yes>> Shaped<S> {
    pub fn http(&self) -> &Arc<dyn HttpServer> {
        &self.http
    }
}

impl<S: Projection<HasCookie = Yes>> Shaped<S> {
    pub fn cookie(&self) -> &Arc<dyn CookieSetter> {
        &self.cookie
    }
}
