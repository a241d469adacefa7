//! Typestate builder recording which sections were configured.

use std::marker::PhantomData;

use super::flags::{Disabled, Flag, Implicit, No, Requested, Toggle, Yes};
use crate::config::{
    ConfigSchema, CookieOptions, DatabaseOptions, HttpOptions, IncomingTransport,
    IncomingTransportOptions, NetworkOptions, RealtimeOptions, Section, SiteOptions, TlsOptions,
    UsersOptions, UsersServerOptions,
};

/// Configuration presence as types.
///
/// | Param | Section                        | Kind   |
/// |-------|--------------------------------|--------|
/// | `D`   | `database`                     | flag   |
/// | `C`   | `configStore`                  | flag   |
/// | `P`   | `network.port`                 | flag   |
/// | `R`   | `realtime`                     | flag   |
/// | `S`   | `realtime.subscriptions`       | toggle |
/// | `I`   | `realtime.incomingTransport`   | toggle |
/// | `O`   | `realtime.outgoingTransport`   | flag   |
/// | `U`   | `users`                        | flag   |
/// | `V`   | `users.server`                 | flag   |
/// | `H`   | `http`                         | flag   |
/// | `K`   | `cookie`                       | toggle |
pub struct Shape<D, C, P, R, S, I, O, U, V, H, K>(
    PhantomData<fn() -> (D, C, P, R, S, I, O, U, V, H, K)>,
);

/// Nothing configured.
pub type EmptyShape = Shape<No, No, No, No, Implicit, Implicit, No, No, No, No, Implicit>;

/// Builds [`SiteOptions`] while tracking its shape in the type.
pub struct ShapedOptionsBuilder<S> {
    options: SiteOptions,
    incoming: Option<IncomingTransport>,
    users_server: Option<UsersServerOptions>,
    cookie: Option<CookieOptions>,
    _shape: PhantomData<S>,
}

/// Options whose shape is known statically.
pub struct ShapedOptions<S> {
    options: SiteOptions,
    _shape: PhantomData<S>,
}

impl<S> Clone for ShapedOptions<S> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            _shape: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for ShapedOptions<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShapedOptions").field(&self.options).finish()
    }
}

impl<S> ShapedOptions<S> {
    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    pub fn into_options(self) -> SiteOptions {
        self.options
    }
}

impl ShapedOptionsBuilder<EmptyShape> {
    pub fn new() -> Self {
        Self {
            options: SiteOptions::default(),
            incoming: None,
            users_server: None,
            cookie: None,
            _shape: PhantomData,
        }
    }
}

impl Default for ShapedOptionsBuilder<EmptyShape> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ShapedOptionsBuilder<S> {
    fn retype<T>(self) -> ShapedOptionsBuilder<T> {
        ShapedOptionsBuilder {
            options: self.options,
            incoming: self.incoming,
            users_server: self.users_server,
            cookie: self.cookie,
            _shape: PhantomData,
        }
    }

    fn network(&mut self) -> &mut NetworkOptions {
        self.options.network.get_or_insert_with(NetworkOptions::default)
    }

    /// Shared host. Does not request a binding by itself.
    pub fn network_host(mut self, host: impl Into<String>) -> Self {
        self.network().host = Some(host.into());
        self
    }

    pub fn network_tls(mut self, tls: TlsOptions) -> Self {
        self.network().tls = Some(tls);
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.options.public = public;
        self
    }

    pub fn verbose_connection_logs(mut self, verbose: bool) -> Self {
        self.options.verbose_connection_logs = verbose;
        self
    }
}

// =============================================================================
// SECTION SETTERS
// =============================================================================

impl<C, P, R, S, I, O, U, V, H, K> ShapedOptionsBuilder<Shape<No, C, P, R, S, I, O, U, V, H, K>> {
    pub fn database(
        mut self,
        database: DatabaseOptions,
    ) -> ShapedOptionsBuilder<Shape<Yes, C, P, R, S, I, O, U, V, H, K>> {
        self.options.database = Some(database);
        self.retype()
    }
}

impl<D, P, R, S, I, O, U, V, H, K> ShapedOptionsBuilder<Shape<D, No, P, R, S, I, O, U, V, H, K>> {
    pub fn config_store(
        mut self,
        schema: ConfigSchema,
    ) -> ShapedOptionsBuilder<Shape<D, Yes, P, R, S, I, O, U, V, H, K>> {
        self.options.config_store = Some(schema);
        self.retype()
    }
}

impl<D, C, R, S, I, O, U, V, H, K> ShapedOptionsBuilder<Shape<D, C, No, R, S, I, O, U, V, H, K>> {
    /// Listen on `port` once, shared by the real-time and HTTP servers.
    pub fn shared_binding(
        mut self,
        port: u16,
    ) -> ShapedOptionsBuilder<Shape<D, C, Yes, R, S, I, O, U, V, H, K>> {
        self.network().port = Some(port);
        self.retype()
    }
}

impl<D, C, P, S, I, O, U, V, H, K> ShapedOptionsBuilder<Shape<D, C, P, No, S, I, O, U, V, H, K>> {
    pub fn realtime(
        mut self,
        realtime: RealtimeOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, S, I, O, U, V, H, K>> {
        self.options.realtime = Some(realtime);
        self.retype()
    }
}

impl<D, C, P, I, O, U, V, H, K>
    ShapedOptionsBuilder<Shape<D, C, P, Yes, Implicit, I, O, U, V, H, K>>
{
    pub fn subscriptions_enabled(
        self,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, Requested, I, O, U, V, H, K>> {
        self.retype()
    }

    pub fn subscriptions_disabled(
        self,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, Disabled, I, O, U, V, H, K>> {
        self.retype()
    }
}

impl<D, C, P, S, O, U, V, H, K>
    ShapedOptionsBuilder<Shape<D, C, P, Yes, S, Implicit, O, U, V, H, K>>
{
    pub fn incoming_transport(
        mut self,
        options: IncomingTransportOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, S, Requested, O, U, V, H, K>> {
        self.incoming = Some(IncomingTransport::Options(options));
        self.retype()
    }

    pub fn incoming_transport_disabled(
        self,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, S, Disabled, O, U, V, H, K>> {
        self.retype()
    }
}

impl<D, C, P, S, I, U, V, H, K> ShapedOptionsBuilder<Shape<D, C, P, Yes, S, I, No, U, V, H, K>> {
    pub fn outgoing_transport(
        self,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, Yes, S, I, Yes, U, V, H, K>> {
        self.retype()
    }
}

impl<D, C, P, R, S, I, O, V, H, K> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, No, V, H, K>> {
    pub fn users(
        mut self,
        users: UsersOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, Yes, V, H, K>> {
        self.options.users = Some(users);
        self.retype()
    }
}

impl<D, C, P, R, S, I, O, H, K> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, Yes, No, H, K>> {
    pub fn users_server(
        mut self,
        server: UsersServerOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, Yes, Yes, H, K>> {
        self.users_server = Some(server);
        self.retype()
    }
}

impl<D, C, P, R, S, I, O, U, V, K> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, No, K>> {
    pub fn http(
        mut self,
        http: HttpOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, Yes, K>> {
        self.options.http = Some(http);
        self.retype()
    }
}

impl<D, C, P, R, S, I, O, U, V, H>
    ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, H, Implicit>>
{
    pub fn cookie(
        mut self,
        cookie: CookieOptions,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, H, Requested>> {
        self.cookie = Some(cookie);
        self.retype()
    }

    pub fn cookie_disabled(
        self,
    ) -> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, H, Disabled>> {
        self.retype()
    }
}

// =============================================================================
// BUILD
// =============================================================================

impl<D, C, P, R, S, I, O, U, V, H, K> ShapedOptionsBuilder<Shape<D, C, P, R, S, I, O, U, V, H, K>>
where
    S: Toggle,
    I: Toggle,
    O: Flag,
    V: Flag,
    K: Toggle,
{
    /// Finish. Toggles are written from the type, so the options and the
    /// shape always agree.
    pub fn build(self) -> ShapedOptions<Shape<D, C, P, R, S, I, O, U, V, H, K>> {
        let mut options = self.options;

        if let Some(realtime) = options.realtime.as_mut() {
            realtime.subscriptions = S::section(Some(true));
            realtime.incoming_transport = I::section(self.incoming);
            realtime.outgoing_transport = if O::ON {
                Section::Enabled(true)
            } else {
                Section::Absent
            };
        }
        if let Some(users) = options.users.as_mut() {
            users.server = self.users_server.filter(|_| V::ON);
        }
        options.cookie = K::section(self.cookie);

        ShapedOptions {
            options,
            _shape: PhantomData,
        }
    }
}
