//! Headless runner — drives spins on a simulated clock
//!
//! Plays the host's part: replays every tick the controller requests,
//! advancing a [`ManualClock`] by one frame interval per `NextFrame` and by
//! the requested delay per `After`.

use crate::case::{CaseDefinition, WeightTable};
use crate::catalog::RewardCatalog;
use crate::config::RouletteConfig;
use crate::controller::{SpinController, TickResult};
use crate::error::{RouletteError, RouletteResult};
use crate::host::{Clock, ManualClock, QueuedScheduler, RenderSink, Wake};
use crate::resolver::SpinOutcome;

/// Tick guard for one spin
pub const DEFAULT_MAX_TICKS: u64 = 100_000;

/// Simulated host loop
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    clock: ManualClock,
    scheduler: QueuedScheduler,
    frame_interval_ms: f64,
    max_ticks: u64,
}

impl HeadlessRunner {
    pub fn new(frame_interval_ms: f64) -> Self {
        Self {
            clock: ManualClock::new(),
            scheduler: QueuedScheduler::new(),
            frame_interval_ms,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    /// Runner using the config's frame interval
    pub fn for_config(config: &RouletteConfig) -> Self {
        Self::new(config.timing.frame_interval_ms)
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Controller wired to this runner's clock and scheduler
    pub fn controller<S: RenderSink>(
        &self,
        config: RouletteConfig,
        sink: S,
    ) -> RouletteResult<SpinController<S>> {
        SpinController::with_sink(config, self.clock.clone(), self.scheduler.clone(), sink)
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &QueuedScheduler {
        &self.scheduler
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Fire the oldest pending tick. `None` when nothing is scheduled.
    pub fn advance_one<S: RenderSink>(
        &self,
        controller: &mut SpinController<S>,
    ) -> Option<TickResult> {
        let wake = self.scheduler.take_next()?;
        self.clock.advance(match wake {
            Wake::NextFrame => self.frame_interval_ms,
            Wake::After(ms) => ms,
        });
        Some(controller.on_tick())
    }

    /// Tick until the active spin resolves
    pub fn run_until_resolved<S: RenderSink>(
        &self,
        controller: &mut SpinController<S>,
    ) -> RouletteResult<SpinOutcome> {
        let mut ticks = 0u64;
        loop {
            if ticks >= self.max_ticks {
                log::warn!("Spin still unresolved after {} ticks", ticks);
                return Err(RouletteError::Stalled { ticks });
            }
            match self.advance_one(controller) {
                Some(TickResult::Resolved(outcome)) => return Ok(outcome),
                Some(_) => ticks += 1,
                None => return Err(RouletteError::NoActiveSpin),
            }
        }
    }

    /// Start and finish one spin
    pub fn spin<S: RenderSink>(
        &self,
        controller: &mut SpinController<S>,
        weights: &WeightTable,
        catalog: &RewardCatalog,
    ) -> RouletteResult<SpinOutcome> {
        controller.start_spin(weights, catalog)?;
        self.run_until_resolved(controller)
    }

    /// Start and finish one spin for a case
    pub fn open_case<S: RenderSink>(
        &self,
        controller: &mut SpinController<S>,
        case: &CaseDefinition,
        shared: &RewardCatalog,
    ) -> RouletteResult<SpinOutcome> {
        controller.start_case(case, shared)?;
        self.run_until_resolved(controller)
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::for_config(&RouletteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RewardCatalogEntry;
    use crate::host::NullSink;
    use crate::rarity::RarityTier;
    use crate::timing::SpinTiming;
    use cf_stage::{SpinPhase, SpinTrace};

    fn catalog() -> RewardCatalog {
        RewardCatalog::new()
            .with_entry(RarityTier::Common, RewardCatalogEntry::new("Bread", "🍞", 20))
            .with_entry(RarityTier::Rare, RewardCatalogEntry::new("Golden Apple", "🍏", 500))
    }

    fn weights() -> WeightTable {
        WeightTable::new()
            .with(RarityTier::Common, 80.0)
            .with(RarityTier::Rare, 20.0)
    }

    #[test]
    fn test_normal_spin_takes_configured_time() {
        let config = RouletteConfig::default();
        let runner = HeadlessRunner::for_config(&config);
        let mut controller = runner.controller(config, NullSink).unwrap().with_seed(1);

        let outcome = runner.spin(&mut controller, &weights(), &catalog()).unwrap();
        let elapsed = runner.now_ms();

        assert!(outcome.is_consistent());
        assert!((3000.0..=5000.0).contains(&outcome.duration_ms));
        let expected = 100.0 + outcome.duration_ms + 500.0;
        assert!(elapsed >= expected && elapsed < expected + 17.0, "{} vs {}", elapsed, expected);
    }

    #[test]
    fn test_trace_sink_is_valid() {
        let config = RouletteConfig::studio();
        let runner = HeadlessRunner::for_config(&config);
        let mut controller = runner
            .controller(config, SpinTrace::new("headless"))
            .unwrap()
            .with_seed(2);

        let outcome = runner.spin(&mut controller, &weights(), &catalog()).unwrap();
        let trace = controller.into_sink();

        let validation = trace.validate();
        assert!(validation.is_valid(), "{:?}", validation.warnings());
        assert_eq!(trace.resolved_item(), Some(outcome.item.name()));
        assert_eq!(trace.phases().last(), Some(&SpinPhase::Done));
    }

    #[test]
    fn test_stall_guard() {
        let config = RouletteConfig::default();
        let runner = HeadlessRunner::for_config(&config).with_max_ticks(5);
        let mut controller = runner.controller(config, NullSink).unwrap();

        assert_eq!(
            runner.spin(&mut controller, &weights(), &catalog()),
            Err(RouletteError::Stalled { ticks: 5 })
        );
        assert!(controller.is_spinning());
    }

    #[test]
    fn test_nothing_to_run() {
        let runner = HeadlessRunner::new(16.0);
        let mut controller = runner.controller(RouletteConfig::studio(), NullSink).unwrap();
        assert_eq!(runner.advance_one(&mut controller), None);
        assert_eq!(runner.run_until_resolved(&mut controller), Err(RouletteError::NoActiveSpin));
    }

    #[test]
    fn test_back_to_back_spins() {
        let config = RouletteConfig::default().with_timing(SpinTiming::turbo());
        let runner = HeadlessRunner::for_config(&config);
        let mut controller = runner.controller(config, NullSink).unwrap().with_seed(3);

        for _ in 0..5 {
            runner.spin(&mut controller, &weights(), &catalog()).unwrap();
        }
        assert_eq!(controller.spin_count(), 5);
        assert_eq!(runner.scheduler().pending(), 0);
    }
}
