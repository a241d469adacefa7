//! Options → ordered build plan. Pure; performs no I/O.

use crate::config::{IncomingTransport, Section, SiteOptions};
use crate::registry::SubsystemId;

/// One entry of the HTTP middleware pipeline, in the order it is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareSlot {
    Cookie,
    Static,
    Template,
    /// Index into `http.middlewares`.
    Custom(usize),
}

/// What to build. Carries the decisions a builder must not re-derive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    Database,
    ConfigStore,
    SharedBinding,
    Realtime,
    Subscriptions { persistent: bool },
    IncomingTransport,
    OutgoingTransport,
    UsersServer,
    Users,
    Http { middlewares: Vec<MiddlewareSlot> },
    Cookie,
}

impl BuildStep {
    /// The subsystem this step produces.
    #[must_use]
    pub fn id(&self) -> SubsystemId {
        match self {
            Self::Database => SubsystemId::Database,
            Self::ConfigStore => SubsystemId::ConfigStore,
            Self::SharedBinding => SubsystemId::SharedBinding,
            Self::Realtime => SubsystemId::Realtime,
            Self::Subscriptions { .. } => SubsystemId::Subscriptions,
            Self::IncomingTransport => SubsystemId::IncomingTransport,
            Self::OutgoingTransport => SubsystemId::OutgoingTransport,
            Self::UsersServer => SubsystemId::UsersServer,
            Self::Users => SubsystemId::Users,
            Self::Http { .. } => SubsystemId::Http,
            Self::Cookie => SubsystemId::Cookie,
        }
    }
}

/// A step plus the already-planned subsystems it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: BuildStep,
    pub inputs: Vec<SubsystemId>,
}

/// Ordered list of steps. Every input precedes the step that consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    pub steps: Vec<PlannedStep>,
}

impl BuildPlan {
    /// Whether a step producing `id` is planned.
    #[must_use]
    pub fn contains(&self, id: SubsystemId) -> bool {
        self.steps.iter().any(|planned| planned.step.id() == id)
    }

    /// Planned subsystems, in plan order.
    #[must_use]
    pub fn ids(&self) -> Vec<SubsystemId> {
        self.steps.iter().map(|planned| planned.step.id()).collect()
    }

    #[must_use]
    pub fn get(&self, id: SubsystemId) -> Option<&PlannedStep> {
        self.steps.iter().find(|planned| planned.step.id() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, step: BuildStep, inputs: Vec<SubsystemId>) {
        self.steps.push(PlannedStep { step, inputs });
    }

    /// `id` when planned, for optional inputs.
    fn optional(&self, id: SubsystemId) -> Option<SubsystemId> {
        self.contains(id).then_some(id)
    }
}

/// Map configuration presence to an ordered build plan.
#[must_use]
pub fn resolve(options: &SiteOptions) -> BuildPlan {
    let mut plan = BuildPlan::default();

    // 1. Database lane
    let has_database = options.database.is_some();
    if has_database {
        plan.push(BuildStep::Database, vec![]);
        if options.config_store.is_some() {
            plan.push(BuildStep::ConfigStore, vec![SubsystemId::Database]);
        }
    }

    // 2. Shared binding, only with an explicit port
    let shared_port = options.network.as_ref().and_then(|network| network.port);
    if (options.realtime.is_some() || options.http.is_some()) && shared_port.is_some() {
        plan.push(BuildStep::SharedBinding, vec![]);
    }

    // 3-6. Real-time server and its dependents
    if let Some(realtime) = &options.realtime {
        let binding = plan.optional(SubsystemId::SharedBinding);
        plan.push(BuildStep::Realtime, binding.into_iter().collect());

        if !matches!(
            realtime.subscriptions,
            Section::Disabled | Section::Enabled(false)
        ) {
            plan.push(
                BuildStep::Subscriptions {
                    persistent: has_database,
                },
                vec![SubsystemId::Realtime],
            );
        }

        let incoming_requested = realtime
            .incoming_transport
            .enabled()
            .is_some_and(IncomingTransport::is_requested);
        if !realtime.incoming_transport.is_disabled()
            && (incoming_requested || (has_database && options.users.is_some()))
        {
            plan.push(BuildStep::IncomingTransport, vec![SubsystemId::Realtime]);
        }

        if realtime.outgoing_transport == Section::Enabled(true) {
            plan.push(BuildStep::OutgoingTransport, vec![SubsystemId::Realtime]);
        }
    }

    // 7. Users: networked when everything it needs is planned
    if let Some(users) = &options.users {
        if has_database {
            let networked = users.server.is_some()
                && plan.contains(SubsystemId::Realtime)
                && plan.contains(SubsystemId::Subscriptions);

            if networked {
                let mut inputs = vec![
                    SubsystemId::Database,
                    SubsystemId::Realtime,
                    SubsystemId::Subscriptions,
                ];
                inputs.extend(plan.optional(SubsystemId::IncomingTransport));
                plan.push(BuildStep::UsersServer, inputs);
            } else {
                plan.push(BuildStep::Users, vec![SubsystemId::Database]);
            }
        }
    }

    // 8. HTTP server and its middleware pipeline
    if let Some(http) = &options.http {
        let mut middlewares = Vec::new();
        if !options.cookie.is_disabled() {
            middlewares.push(MiddlewareSlot::Cookie);
        }
        if !http.static_files.is_disabled() {
            middlewares.push(MiddlewareSlot::Static);
        }
        if !http.template.is_disabled() {
            middlewares.push(MiddlewareSlot::Template);
        }
        middlewares.extend((0..http.middlewares.len()).map(MiddlewareSlot::Custom));

        let binding = plan.optional(SubsystemId::SharedBinding);
        plan.push(
            BuildStep::Http { middlewares },
            binding.into_iter().collect(),
        );
    }

    // 9. Cookie setter
    if !options.cookie.is_disabled()
        && plan.contains(SubsystemId::UsersServer)
        && plan.contains(SubsystemId::Http)
    {
        plan.push(
            BuildStep::Cookie,
            vec![SubsystemId::UsersServer, SubsystemId::Http],
        );
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(json: &str) -> BuildPlan {
        resolve(&SiteOptions::from_json_str(json).unwrap())
    }

    const DB: &str = r#""database": {"url": "mem://", "name": "site"}"#;

    #[test]
    fn test_empty_options_plan_nothing() {
        assert!(plan("{}").is_empty());
    }

    #[test]
    fn test_database_only() {
        assert_eq!(plan(&format!("{{{DB}}}")).ids(), vec![SubsystemId::Database]);
    }

    #[test]
    fn test_config_store_needs_database() {
        assert!(!plan(r#"{"configStore": {}}"#).contains(SubsystemId::ConfigStore));
        assert_eq!(
            plan(&format!(r#"{{{DB}, "configStore": {{"a": 1}}}}"#)).ids(),
            vec![SubsystemId::Database, SubsystemId::ConfigStore]
        );
    }

    #[test]
    fn test_users_without_database_is_skipped() {
        assert!(plan(r#"{"users": {"name": "U"}}"#).is_empty());
    }

    #[test]
    fn test_plain_users() {
        let plan = plan(&format!(r#"{{{DB}, "users": {{"name": "U"}}}}"#));
        assert_eq!(plan.ids(), vec![SubsystemId::Database, SubsystemId::Users]);
    }

    #[test]
    fn test_networked_users() {
        let plan = plan(&format!(
            r#"{{{DB}, "realtime": {{"subscriptions": true}}, "users": {{"server": {{}}}}}}"#
        ));
        assert_eq!(
            plan.ids(),
            vec![
                SubsystemId::Database,
                SubsystemId::Realtime,
                SubsystemId::Subscriptions,
                SubsystemId::IncomingTransport,
                SubsystemId::UsersServer,
            ]
        );
        assert_eq!(
            plan.get(SubsystemId::UsersServer).unwrap().inputs,
            vec![
                SubsystemId::Database,
                SubsystemId::Realtime,
                SubsystemId::Subscriptions,
                SubsystemId::IncomingTransport,
            ]
        );
        assert_eq!(
            plan.get(SubsystemId::Subscriptions).unwrap().step,
            BuildStep::Subscriptions { persistent: true }
        );
    }

    #[test]
    fn test_users_server_without_subscriptions_degrades() {
        let plan = plan(&format!(
            r#"{{{DB}, "realtime": {{"subscriptions": null}}, "users": {{"server": {{}}}}}}"#
        ));
        assert!(!plan.contains(SubsystemId::Subscriptions));
        assert!(!plan.contains(SubsystemId::UsersServer));
        assert!(plan.contains(SubsystemId::Users));
    }

    #[test]
    fn test_subscriptions_false_is_off() {
        let plan = plan(r#"{"realtime": {"subscriptions": false}}"#);
        assert_eq!(plan.ids(), vec![SubsystemId::Realtime]);
    }

    #[test]
    fn test_subscriptions_without_database_are_not_persistent() {
        let plan = plan(r#"{"realtime": {}}"#);
        assert_eq!(
            plan.get(SubsystemId::Subscriptions).unwrap().step,
            BuildStep::Subscriptions { persistent: false }
        );
    }

    #[test]
    fn test_incoming_transport_rules() {
        // Explicit request, no users needed
        assert!(plan(r#"{"realtime": {"incomingTransport": true}}"#)
            .contains(SubsystemId::IncomingTransport));
        // `false` is not a request, and there are no users to imply one
        assert!(!plan(r#"{"realtime": {"incomingTransport": false}}"#)
            .contains(SubsystemId::IncomingTransport));
        // Implied by database + users
        assert!(plan(&format!(r#"{{{DB}, "realtime": {{}}, "users": {{}}}}"#))
            .contains(SubsystemId::IncomingTransport));
        // `null` wins over the implication
        assert!(!plan(&format!(
            r#"{{{DB}, "realtime": {{"incomingTransport": null}}, "users": {{}}}}"#
        ))
        .contains(SubsystemId::IncomingTransport));
    }

    #[test]
    fn test_outgoing_transport_only_when_true() {
        assert!(plan(r#"{"realtime": {"outgoingTransport": true}}"#)
            .contains(SubsystemId::OutgoingTransport));
        assert!(!plan(r#"{"realtime": {}}"#).contains(SubsystemId::OutgoingTransport));
        assert!(!plan(r#"{"realtime": {"outgoingTransport": null}}"#)
            .contains(SubsystemId::OutgoingTransport));
    }

    #[test]
    fn test_realtime_dependents_need_realtime() {
        let plan = plan(&format!(r#"{{{DB}, "users": {{"server": {{}}}}, "http": true}}"#));
        assert!(!plan.contains(SubsystemId::Subscriptions));
        assert!(!plan.contains(SubsystemId::IncomingTransport));
        assert!(!plan.contains(SubsystemId::UsersServer));
        assert!(!plan.contains(SubsystemId::Cookie));
    }

    #[test]
    fn test_shared_binding_needs_port() {
        let without_port = plan(r#"{"realtime": {}, "http": true, "network": {"host": "::"}}"#);
        assert!(!without_port.contains(SubsystemId::SharedBinding));
        assert!(without_port.get(SubsystemId::Http).unwrap().inputs.is_empty());

        let with_port = plan(r#"{"realtime": {}, "http": true, "network": {"port": 80}}"#);
        assert_eq!(
            with_port.get(SubsystemId::Realtime).unwrap().inputs,
            vec![SubsystemId::SharedBinding]
        );
        assert_eq!(
            with_port.get(SubsystemId::Http).unwrap().inputs,
            vec![SubsystemId::SharedBinding]
        );

        // Nothing to share with
        assert!(plan(r#"{"network": {"port": 80}}"#).is_empty());
    }

    #[test]
    fn test_http_true_default_middlewares() {
        let plan = plan(r#"{"http": true}"#);
        assert_eq!(plan.ids(), vec![SubsystemId::Http]);
        assert_eq!(
            plan.get(SubsystemId::Http).unwrap().step,
            BuildStep::Http {
                middlewares: vec![
                    MiddlewareSlot::Cookie,
                    MiddlewareSlot::Static,
                    MiddlewareSlot::Template
                ]
            }
        );
    }

    #[test]
    fn test_null_middlewares_are_omitted() {
        let plan = plan(r#"{"cookie": null, "http": {"static": null}}"#);
        assert_eq!(
            plan.get(SubsystemId::Http).unwrap().step,
            BuildStep::Http {
                middlewares: vec![MiddlewareSlot::Template]
            }
        );
    }

    fn full(cookie: &str) -> String {
        format!(
            r#"{{{DB}, "realtime": {{}}, "users": {{"server": {{}}}}, "http": true{cookie}}}"#
        )
    }

    #[test]
    fn test_cookie_rules() {
        assert!(plan(&full("")).contains(SubsystemId::Cookie));
        assert!(plan(&full(r#", "cookie": {"domain": "x"}"#)).contains(SubsystemId::Cookie));
        assert!(!plan(&full(r#", "cookie": null"#)).contains(SubsystemId::Cookie));
    }

    #[test]
    fn test_inputs_precede_consumers() {
        let plan = plan(&format!(
            r#"{{{DB}, "configStore": {{}}, "network": {{"port": 1}}, "realtime": {{"outgoingTransport": true}},
                "users": {{"server": {{}}}}, "http": true}}"#
        ));
        let ids = plan.ids();
        assert_eq!(ids.len(), SubsystemId::all().len() - 1); // plain users excluded
        for (position, planned) in plan.steps.iter().enumerate() {
            for input in &planned.inputs {
                let input_position = ids.iter().position(|id| id == input).unwrap();
                assert!(input_position < position);
            }
        }
    }
}
