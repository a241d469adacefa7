//! # Site
//!
//! The composition root. Owns every subsystem it builds, builds each at
//! most once, and publishes a single readiness outcome.
//!
//! ```text
//!   Site::new ──► NotStarted ──initialize()──► InProgress ──► Ready
//!                                                   │
//!                                                   └──────► Failed
//! ```
//!
//! Phases of `initialize`:
//!
//! 1. database lane (database, config store) ∥ network lane (shared binding)
//! 2. real-time server and its dependents
//! 3. users (networked or plain)
//! 4. HTTP server, then the cookie setter

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use insite_bus::{InMemoryEventBus, SiteEvent};
use insite_telemetry::{
    log_subsystem, metric_inc, INITIALIZATION_DURATION, REALTIME_CONNECTIONS, REALTIME_ERRORS,
};
use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::readiness::Readiness;
use super::{SiteComponents, UsersVariant};
use crate::builders::{self, BuildContext};
use crate::config::SiteOptions;
use crate::error::{CollaboratorError, SiteError};
use crate::ports::*;
use crate::registry::{InitStatus, SubsystemId, SubsystemRegistry, SubsystemStatus};
use crate::shape::{Projection, Shaped, ShapedOptions};
use crate::wiring::{resolve, BuildPlan, PlannedStep};

/// A composite server built from one [`SiteOptions`].
pub struct Site {
    options: SiteOptions,
    collaborators: Collaborators,
    plan: BuildPlan,
    status: AtomicU8,
    readiness: Readiness,
    event_bus: Arc<InMemoryEventBus>,
    registry: SubsystemRegistry,
    realtime_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Site {
    /// Resolve the build plan. Performs no I/O and builds nothing.
    ///
    /// Nothing is scheduled either: the site stays `NotStarted` until
    /// [`initialize`](Self::initialize) is called. Use [`launch`](Self::launch)
    /// to construct and start in one step.
    pub fn new(options: SiteOptions, collaborators: Collaborators) -> Arc<Self> {
        let plan = resolve(&options);
        let registry = SubsystemRegistry::new();
        for id in plan.ids() {
            registry.set(id, SubsystemStatus::Pending);
        }

        debug!(planned = ?plan.ids(), "Site created");

        Arc::new(Self {
            options,
            collaborators,
            plan,
            status: AtomicU8::new(InitStatus::NotStarted as u8),
            readiness: Readiness::new(),
            event_bus: Arc::new(InMemoryEventBus::new()),
            registry,
            realtime_watcher: Mutex::new(None),
        })
    }

    /// Construct and start initializing in the background.
    ///
    /// Must be called within a tokio runtime. Observe the outcome with
    /// [`when_ready`](Self::when_ready).
    pub fn launch(options: SiteOptions, collaborators: Collaborators) -> Arc<Self> {
        let site = Self::new(options, collaborators);
        let task = Arc::clone(&site);
        tokio::spawn(async move {
            if let Err(e) = task.initialize().await {
                debug!(error = %e, "Background initialization failed");
            }
        });
        site
    }

    /// Construct, initialize and return the ready site.
    pub async fn init(
        options: SiteOptions,
        collaborators: Collaborators,
    ) -> Result<Arc<Self>, SiteError> {
        let site = Self::new(options, collaborators);
        site.initialize().await?;
        site.when_ready().await
    }

    /// Like [`init`](Self::init), but the result exposes the fields the
    /// shape guarantees without `Option`.
    pub async fn init_shaped<S: Projection>(
        options: ShapedOptions<S>,
        collaborators: Collaborators,
    ) -> Result<Shaped<S>, SiteError> {
        let site = Self::init(options.into_options(), collaborators).await?;
        Shaped::project(site).await
    }

    /// Build every planned subsystem, exactly once.
    ///
    /// Only the first call does any work; later calls return `Ok(())`
    /// immediately, whether the first is still running or already done.
    /// A builder error is returned to the caller that started the run and
    /// also settles readiness.
    pub async fn initialize(&self) -> Result<(), SiteError> {
        if self
            .status
            .compare_exchange(
                InitStatus::NotStarted as u8,
                InitStatus::InProgress as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!(status = ?self.status(), "Initialization already started");
            return Ok(());
        }

        let started = Instant::now();
        info!("Initializing site ({} subsystems planned)", self.plan.steps.len());

        match self.build().await {
            Ok(components) => {
                let components = Arc::new(components);
                let built: Vec<String> = components
                    .built()
                    .iter()
                    .map(|id| id.name().to_string())
                    .collect();

                // Components are visible before the status says Ready
                self.readiness.settle(Ok(components));
                self.status.store(InitStatus::Ready as u8, Ordering::Release);
                INITIALIZATION_DURATION.observe(started.elapsed().as_secs_f64());

                info!(built = ?built, "Site ready");
                self.event_bus.emit(SiteEvent::SiteReady { built });
                Ok(())
            }
            Err(e) => {
                self.readiness.settle(Err(e.clone()));
                self.status.store(InitStatus::Failed as u8, Ordering::Release);

                error!(error = %e, "Site initialization failed");
                self.event_bus.emit(SiteEvent::SiteFailed {
                    subsystem: e.subsystem().map(|id| id.name().to_string()).unwrap_or_default(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn build(&self) -> Result<SiteComponents, SiteError> {
        let ctx = BuildContext {
            options: &self.options,
            collaborators: &self.collaborators,
            bus: &self.event_bus,
            registry: &self.registry,
        };

        let (database_lane, rest): (Vec<&PlannedStep>, Vec<&PlannedStep>) =
            self.plan.steps.iter().partition(|planned| {
                matches!(
                    planned.step.id(),
                    SubsystemId::Database | SubsystemId::ConfigStore
                )
            });
        let (network_lane, rest): (Vec<&PlannedStep>, Vec<&PlannedStep>) = rest
            .into_iter()
            .partition(|planned| planned.step.id() == SubsystemId::SharedBinding);

        // Phase 1: independent lanes
        let (mut components, network) = tokio::try_join!(
            run_lane(ctx, &database_lane),
            run_lane(ctx, &network_lane)
        )?;
        components.merge(network);

        // Phases 2-4: strictly in plan order
        for planned in rest {
            builders::execute(ctx, planned, &mut components).await?;

            if planned.step.id() == SubsystemId::Realtime {
                if let Some(realtime) = components.realtime() {
                    self.watch_realtime(realtime);
                }
            }
        }

        Ok(components)
    }

    /// Forward real-time lifecycle events to logs, metrics and the bus.
    fn watch_realtime(&self, realtime: Arc<dyn RealtimeServer>) {
        let mut events = realtime.events();
        let bus = Arc::clone(&self.event_bus);
        let verbose = self.options.verbose_connection_logs;

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(RealtimeEvent::Connected {
                        connection_id,
                        user,
                    }) => {
                        metric_inc!(REALTIME_CONNECTIONS);
                        if verbose {
                            log_subsystem!(
                                info,
                                "realtime",
                                "🔌 Real-time client connected",
                                %connection_id,
                                user = user.as_deref().unwrap_or("anonymous")
                            );
                        }
                        bus.emit(SiteEvent::RealtimeConnected {
                            connection_id,
                            user,
                        });
                    }
                    Ok(RealtimeEvent::Error(message)) => {
                        metric_inc!(REALTIME_ERRORS);
                        log_subsystem!(error, "realtime", "🔌❗️ Real-time server error", %message);
                        bus.emit(SiteEvent::RealtimeError { message });
                    }
                    Ok(RealtimeEvent::Closed) => {
                        log_subsystem!(error, "realtime", "🔌❗️ Real-time server closed");
                        bus.emit(SiteEvent::RealtimeClosed);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log_subsystem!(warn, "realtime", "Real-time event watcher lagged", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            log_subsystem!(debug, "realtime", "Real-time event watcher stopped");
        });

        *self.realtime_watcher.lock() = Some(handle);
    }

    /// Wait for initialization to settle and return this site.
    ///
    /// Any number of callers may wait, before or after settling; all see
    /// the same outcome. Does not start initialization: on a site from
    /// [`new`](Self::new) this waits until someone calls
    /// [`initialize`](Self::initialize).
    pub async fn when_ready(self: &Arc<Self>) -> Result<Arc<Self>, SiteError> {
        self.readiness.wait().await.map(|_| Arc::clone(self))
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn status(&self) -> InitStatus {
        InitStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// What `initialize` will build, decided at construction.
    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Lifecycle events: subsystem outcomes, readiness, real-time server.
    pub fn events(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn registry(&self) -> &SubsystemRegistry {
        &self.registry
    }

    /// Built components. `None` until ready, and after a failure.
    pub fn components(&self) -> Option<Arc<SiteComponents>> {
        match self.readiness.peek() {
            Some(Ok(components)) => Some(components),
            Some(Err(_)) | None => None,
        }
    }

    /// Field names of built subsystems.
    pub fn built(&self) -> Vec<SubsystemId> {
        self.components()
            .map(|components| components.built())
            .unwrap_or_default()
    }

    // =========================================================================
    // ACCESSOR METHODS
    // =========================================================================

    pub fn client(&self) -> Option<Arc<dyn DatabaseClient>> {
        self.components()?.client()
    }

    pub fn database(&self) -> Option<Arc<dyn DatabaseHandle>> {
        self.components()?.database()
    }

    pub fn collections(&self) -> Option<Arc<dyn Collections>> {
        self.components()?.collections()
    }

    pub fn config(&self) -> Option<Arc<dyn ConfigHandle>> {
        self.components()?.config()
    }

    pub fn binding(&self) -> Option<Arc<dyn SharedBinding>> {
        self.components()?.binding()
    }

    pub fn realtime(&self) -> Option<Arc<dyn RealtimeServer>> {
        self.components()?.realtime()
    }

    pub fn subscriptions(&self) -> Option<Arc<dyn SubscriptionDispatcher>> {
        self.components()?.subscriptions()
    }

    pub fn incoming_transport(&self) -> Option<Arc<dyn IncomingTransportHandle>> {
        self.components()?.incoming_transport()
    }

    pub fn outgoing_transport(&self) -> Option<Arc<dyn OutgoingTransportHandle>> {
        self.components()?.outgoing_transport()
    }

    pub fn users(&self) -> Option<Arc<dyn UsersLayer>> {
        self.components()?.users()
    }

    pub fn users_server(&self) -> Option<Arc<dyn UsersServer>> {
        self.components()?.users_server()
    }

    pub fn users_variant(&self) -> Option<UsersVariant> {
        self.components()?.users_variant()
    }

    pub fn http(&self) -> Option<Arc<dyn HttpServer>> {
        self.components()?.http()
    }

    pub fn cookie(&self) -> Option<Arc<dyn CookieSetter>> {
        self.components()?.cookie()
    }
}

async fn run_lane(
    ctx: BuildContext<'_>,
    steps: &[&PlannedStep],
) -> Result<SiteComponents, CollaboratorError> {
    let mut part = SiteComponents::default();
    for planned in steps {
        builders::execute(ctx, planned, &mut part).await?;
    }
    Ok(part)
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("status", &self.status())
            .field("planned", &self.plan.ids())
            .field("built", &self.built())
            .finish()
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        if let Some(handle) = self.realtime_watcher.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryProbe;
    use insite_bus::EventFilter;
    use std::time::Duration;

    fn options(json: &str) -> SiteOptions {
        SiteOptions::from_json_str(json).unwrap()
    }

    #[test]
    fn test_new_builds_nothing() {
        let probe = MemoryProbe::new();
        let site = Site::new(
            options(r#"{"database": {"url": "mem://", "name": "s"}}"#),
            Collaborators::with_probe(probe.clone()),
        );

        assert_eq!(site.status(), InitStatus::NotStarted);
        assert!(probe.order().is_empty());
        assert!(site.components().is_none());
        assert_eq!(
            site.registry().get_status(SubsystemId::Database),
            SubsystemStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let probe = MemoryProbe::new();
        let site = Site::new(
            options(r#"{"database": {"url": "mem://", "name": "s"}, "http": true}"#),
            Collaborators::with_probe(probe.clone()),
        );

        site.initialize().await.unwrap();
        site.initialize().await.unwrap();

        assert_eq!(site.status(), InitStatus::Ready);
        assert_eq!(probe.constructed(SubsystemId::Database), 1);
        assert_eq!(probe.constructed(SubsystemId::Http), 1);
        assert_eq!(site.built(), vec![SubsystemId::Database, SubsystemId::Http]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lanes_run_concurrently() {
        let probe = MemoryProbe::new();
        probe.set_delay(Duration::from_millis(50));
        let site = Site::new(
            options(r#"{"database": {"url": "mem://", "name": "s"}, "network": {"port": 9000}, "http": true}"#),
            Collaborators::with_probe(probe.clone()),
        );

        let started = tokio::time::Instant::now();
        site.initialize().await.unwrap();

        // Database and binding overlap: one 50ms wait on the paused clock, not two
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(100));
        assert!(site.binding().is_some());
        assert!(site.http().unwrap().is_shared());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ready_status_implies_components() {
        let probe = MemoryProbe::new();
        probe.set_delay(Duration::from_millis(5));
        let site = Site::new(
            options(r#"{"database": {"url": "mem://", "name": "s"}, "http": true}"#),
            Collaborators::with_probe(probe),
        );

        let observer = {
            let site = Arc::clone(&site);
            tokio::spawn(async move {
                loop {
                    if site.status() == InitStatus::Ready {
                        return site.components().is_some();
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        site.initialize().await.unwrap();
        assert!(observer.await.unwrap(), "Ready observed before components");
    }

    #[tokio::test]
    async fn test_failure_settles_readiness() {
        let probe = MemoryProbe::new();
        probe.fail_on(SubsystemId::Realtime);
        let site = Site::new(
            options(r#"{"database": {"url": "mem://", "name": "s"}, "realtime": {}, "http": true}"#),
            Collaborators::with_probe(probe.clone()),
        );
        let mut events = site.events().subscribe(EventFilter::all());

        let err = site.initialize().await.unwrap_err();
        assert_eq!(err.subsystem(), Some(SubsystemId::Realtime));
        assert_eq!(site.status(), InitStatus::Failed);
        assert_eq!(site.when_ready().await.unwrap_err(), err);

        // No partial result, no later builders
        assert!(site.client().is_none());
        assert_eq!(probe.constructed(SubsystemId::Http), 0);
        assert_eq!(
            site.registry().get_status(SubsystemId::Realtime),
            SubsystemStatus::Failed
        );

        let mut saw_failure = false;
        while let Ok(Some(event)) = events.try_recv() {
            if let SiteEvent::SiteFailed { subsystem, .. } = event {
                assert_eq!(subsystem, "realtime");
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }
}
