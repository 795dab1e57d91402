//! Spin Controller — owns the single active spin session
//!
//! ```text
//! start_spin ─► sample ─► build reel ─► draw duration ─► driver.start
//!                                                          │
//!        host tick ─► on_tick ─► driver.step ◄─────────────┘
//!                                    │
//!                                  Done ─► resolve ─► SpinTicket ready
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use cf_stage::SpinPhase;
use futures::FutureExt;
use futures::channel::oneshot;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::case::{CaseDefinition, WeightTable};
use crate::catalog::{RewardCatalog, RolledItem};
use crate::config::RouletteConfig;
use crate::driver::{AnimationDriver, DriverStep};
use crate::error::{RouletteError, RouletteResult};
use crate::host::{Clock, NullSink, RenderSink, TickScheduler, Wake};
use crate::resolver::{OutcomeResolver, SpinOutcome};
use crate::sampler::sample_reward;
use crate::sequence::{ReelSequence, SequenceBuilder, winning_index_for};

/// Thumbnails shown on a case card
pub const PREVIEW_ICON_COUNT: usize = 4;

/// State of the spin in flight
///
/// Exclusively owned by the controller and dropped when the spin resolves.
#[derive(Debug)]
pub struct SpinSession {
    spin_id: u64,
    case_id: Option<String>,
    authoritative: RolledItem,
    sequence: ReelSequence,
    driver: AnimationDriver,
    duration_ms: f64,
    reply: Option<oneshot::Sender<RouletteResult<SpinOutcome>>>,
}

impl SpinSession {
    pub fn spin_id(&self) -> u64 {
        self.spin_id
    }

    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }

    /// What the sampler drew
    pub fn authoritative(&self) -> &RolledItem {
        &self.authoritative
    }

    pub fn sequence(&self) -> &ReelSequence {
        &self.sequence
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn phase(&self) -> SpinPhase {
        self.driver.phase()
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn deliver(&mut self, outcome: &SpinOutcome) {
        if let Some(reply) = self.reply.take() {
            // Receiver may have been dropped; the outcome is still returned to the host
            let _ = reply.send(Ok(outcome.clone()));
        }
    }
}

/// Result of one host tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickResult {
    /// No spin in flight
    Idle,
    /// Spin still animating, next tick requested
    Pending,
    /// Spin finished on this tick
    Resolved(SpinOutcome),
}

/// Answer to a close request from the spin view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Nothing in flight; close freely
    Closed,
    /// A spin is animating; ask the user before calling `confirm_close`
    NeedsConfirmation,
}

/// Runs spins one at a time
pub struct SpinController<S: RenderSink = NullSink> {
    config: RouletteConfig,
    rng: ChaCha8Rng,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn TickScheduler>,
    sink: S,
    resolver: OutcomeResolver,
    session: Option<SpinSession>,
    /// A wake has been requested from the host and has not fired yet
    tick_outstanding: bool,
    spin_count: u64,
    last_outcome: Option<SpinOutcome>,
}

impl SpinController<NullSink> {
    /// Controller without render output
    pub fn new(
        config: RouletteConfig,
        clock: impl Clock + 'static,
        scheduler: impl TickScheduler + 'static,
    ) -> RouletteResult<Self> {
        Self::with_sink(config, clock, scheduler, NullSink)
    }
}

impl<S: RenderSink> SpinController<S> {
    pub fn with_sink(
        config: RouletteConfig,
        clock: impl Clock + 'static,
        scheduler: impl TickScheduler + 'static,
        sink: S,
    ) -> RouletteResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::from_os_rng(),
            clock: Box::new(clock),
            scheduler: Box::new(scheduler),
            sink,
            resolver: OutcomeResolver,
            session: None,
            tick_outstanding: false,
            spin_count: 0,
            last_outcome: None,
        })
    }

    /// Reproducible draws from here on
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PREVIEW
    // ═══════════════════════════════════════════════════════════════════════════

    /// Idle browsing reel for a weight table
    pub fn preview(
        &mut self,
        weights: &WeightTable,
        catalog: &RewardCatalog,
    ) -> RouletteResult<ReelSequence> {
        SequenceBuilder::new(catalog, &self.config.decoys, self.config.preview_fallback)
            .build_preview(weights, self.config.preview_length, &mut self.rng)
    }

    /// Browsing reel for a case
    pub fn preview_case(
        &mut self,
        case: &CaseDefinition,
        shared: &RewardCatalog,
    ) -> RouletteResult<ReelSequence> {
        self.preview(&case.weights, case.pools(shared))
    }

    /// Distinct thumbnails for a case card
    pub fn preview_icons(
        &mut self,
        case: &CaseDefinition,
        shared: &RewardCatalog,
    ) -> Vec<RolledItem> {
        let pools = case.pools(shared);
        SequenceBuilder::new(pools, &self.config.decoys, self.config.preview_fallback)
            .preview_icons(&case.weights, PREVIEW_ICON_COUNT, &mut self.rng)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin. Rejected while another spin is in flight.
    ///
    /// Draw order: winner tier, winner entry, decoys by reel position, duration.
    pub fn start_spin(
        &mut self,
        weights: &WeightTable,
        catalog: &RewardCatalog,
    ) -> RouletteResult<SpinTicket> {
        self.open(weights, catalog, None)
    }

    /// Start a spin for a case, drawing from its own pools when it has them
    pub fn start_case(
        &mut self,
        case: &CaseDefinition,
        shared: &RewardCatalog,
    ) -> RouletteResult<SpinTicket> {
        self.reject_if_busy()?;
        case.validate(shared)?;
        self.open(&case.weights, case.pools(shared), Some(case.id.clone()))
    }

    fn open(
        &mut self,
        weights: &WeightTable,
        catalog: &RewardCatalog,
        case_id: Option<String>,
    ) -> RouletteResult<SpinTicket> {
        self.reject_if_busy()?;

        let authoritative = sample_reward(weights, catalog, &mut self.rng)?;
        let builder =
            SequenceBuilder::new(catalog, &self.config.decoys, self.config.preview_fallback);
        let sequence = builder.build_spin(&authoritative, self.config.spin_length, &mut self.rng)?;
        let duration_ms = self.config.timing.draw_duration(&mut self.rng);

        let now = self.clock.now_ms();
        let winning_index = sequence
            .winning_index()
            .unwrap_or_else(|| winning_index_for(sequence.len()));
        let mut driver = AnimationDriver::new(
            self.config.geometry,
            &self.config.timing,
            sequence.len(),
            winning_index,
            duration_ms,
        );

        self.sink.sequence_built(&sequence, now);
        if let DriverStep::Wait(wake) = driver.start(now, &mut self.sink) {
            self.schedule(wake);
        }

        self.spin_count += 1;
        let spin_id = self.spin_count;
        log::info!(
            "Spin #{} started{}: '{}' ({}) at index {}, {:.0}ms",
            spin_id,
            case_id.as_deref().map(|id| format!(" for case '{}'", id)).unwrap_or_default(),
            authoritative.name(),
            authoritative.tier,
            winning_index,
            duration_ms
        );

        let (reply, receiver) = oneshot::channel();
        self.session = Some(SpinSession {
            spin_id,
            case_id,
            authoritative,
            sequence,
            driver,
            duration_ms,
            reply: Some(reply),
        });

        Ok(SpinTicket { spin_id, receiver })
    }

    /// Advance the active spin to the clock's current time. Call once per
    /// fired wake.
    ///
    /// Requests another tick only while the spin is unfinished.
    pub fn on_tick(&mut self) -> TickResult {
        self.tick_outstanding = false;
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return TickResult::Idle;
        };

        match session.driver.step(now, &mut self.sink) {
            DriverStep::Idle => TickResult::Idle,
            DriverStep::Wait(wake) => {
                self.schedule(wake);
                TickResult::Pending
            }
            DriverStep::Done(report) => {
                let outcome = self.resolver.resolve(
                    &session.sequence,
                    &report,
                    &session.authoritative,
                    session.duration_ms,
                );
                session.deliver(&outcome);
                log::info!(
                    "Spin #{} resolved: '{}' ({}) after {} ticks",
                    session.spin_id,
                    outcome.item.name(),
                    outcome.item.tier,
                    report.ticks
                );
                self.session = None;
                self.sink.resolved(&outcome, now);
                self.last_outcome = Some(outcome.clone());
                TickResult::Resolved(outcome)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CANCELLATION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn request_close(&self) -> CloseDecision {
        if self.is_spinning() {
            CloseDecision::NeedsConfirmation
        } else {
            CloseDecision::Closed
        }
    }

    /// Abandon the animation and deliver the sampled item.
    ///
    /// The pending wake is cancelled with the host. If the host cannot
    /// cancel it, it stays outstanding and drives the next spin instead of
    /// a second wake being requested.
    pub fn confirm_close(&mut self) -> RouletteResult<SpinOutcome> {
        let mut session = self.session.take().ok_or(RouletteError::NoActiveSpin)?;
        let now = self.clock.now_ms();

        if self.tick_outstanding && self.scheduler.cancel_pending() {
            self.tick_outstanding = false;
        }

        session.driver.abandon(now, &mut self.sink);
        self.sink.abandoned(now);

        let outcome = self
            .resolver
            .abandon(&session.sequence, &session.authoritative, session.duration_ms);
        session.deliver(&outcome);
        log::warn!(
            "Spin #{} closed mid-animation; delivering '{}' ({})",
            session.spin_id,
            outcome.item.name(),
            outcome.item.tier
        );

        self.sink.resolved(&outcome, now);
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn phase(&self) -> SpinPhase {
        self.session
            .as_ref()
            .map(SpinSession::phase)
            .unwrap_or(SpinPhase::Idle)
    }

    pub fn is_spinning(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &RouletteConfig {
        &self.config
    }

    /// Spins started so far
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// At most one wake is ever outstanding
    fn schedule(&mut self, wake: Wake) {
        if self.tick_outstanding {
            log::debug!("Wake already outstanding; not requesting {:?}", wake);
            return;
        }
        self.tick_outstanding = true;
        self.scheduler.request_tick(wake);
    }

    fn reject_if_busy(&self) -> RouletteResult<()> {
        if let Some(session) = &self.session {
            log::warn!(
                "Rejected spin request: spin #{} is {}",
                session.spin_id,
                session.phase()
            );
            return Err(RouletteError::ConcurrentSpinRejected);
        }
        Ok(())
    }
}

/// Resolves once with the outcome of one spin
///
/// Also resolves with [`RouletteError::SessionAbandoned`] if the controller
/// is dropped before the spin finishes.
#[derive(Debug)]
pub struct SpinTicket {
    spin_id: u64,
    receiver: oneshot::Receiver<RouletteResult<SpinOutcome>>,
}

impl SpinTicket {
    pub fn spin_id(&self) -> u64 {
        self.spin_id
    }

    /// Non-blocking check. `None` while the spin is still animating.
    pub fn try_outcome(&mut self) -> Option<RouletteResult<SpinOutcome>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(RouletteError::SessionAbandoned)),
        }
    }
}

impl Future for SpinTicket {
    type Output = RouletteResult<SpinOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => {
                Poll::Ready(Err(RouletteError::SessionAbandoned))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
