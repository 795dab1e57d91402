//! End-to-end spin behaviour: sample, build, animate, resolve

use cf_roulette::{
    CaseBook, CloseDecision, DecoyPolicy, HeadlessRunner, ManualClock, NullSink, PreviewFallback,
    QueuedScheduler, RarityTier, ReelGeometry, RewardCatalog, RolledItem,
    RouletteConfig, RouletteError, SequenceBuilder, SpinController, SpinOutcome, SpinTiming,
    TickResult, Wake, WeightTable, phased_progress,
};
use cf_stage::{SpinPhase, SpinTrace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn catalog() -> RewardCatalog {
    CaseBook::standard().catalog
}

fn weights() -> WeightTable {
    WeightTable::new()
        .with(RarityTier::Common, 30.0)
        .with(RarityTier::Uncommon, 40.0)
        .with(RarityTier::Rare, 20.0)
        .with(RarityTier::Epic, 10.0)
}

/// Full run on a simulated clock, returning the outcome and the reel it landed on
fn full_run(seed: u64) -> (SpinOutcome, Vec<RolledItem>) {
    let config = RouletteConfig::default();
    let runner = HeadlessRunner::for_config(&config);
    let mut controller = runner.controller(config, SpinTrace::new("run")).unwrap().with_seed(seed);

    controller.start_spin(&weights(), &catalog()).unwrap();
    let reel = controller.session().unwrap().sequence().entries().to_vec();
    let outcome = runner.run_until_resolved(&mut controller).unwrap();
    (outcome, reel)
}

#[test]
fn invalid_weights_are_rejected() {
    let clock = ManualClock::new();
    let scheduler = QueuedScheduler::new();
    let mut controller =
        SpinController::new(RouletteConfig::default(), clock, scheduler.clone()).unwrap();

    for table in [
        WeightTable::new(),
        WeightTable::new().with(RarityTier::Common, 0.0).with(RarityTier::Rare, 0.0),
    ] {
        assert!(matches!(
            controller.start_spin(&table, &catalog()),
            Err(RouletteError::InvalidConfiguration(_))
        ));
    }
    assert!(!controller.is_spinning());
    assert_eq!(scheduler.requested(), 0);
}

#[test]
fn winner_sits_at_the_middle_of_every_reel() {
    let catalog = catalog();
    let policy = DecoyPolicy::default();
    let builder = SequenceBuilder::new(&catalog, &policy, PreviewFallback::default());
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let weights = weights();
    let sampler = cf_roulette::WeightedSampler::new(&weights, &catalog).unwrap();

    for _ in 0..500 {
        let winner = sampler.sample(&mut rng);
        let reel = builder.build_spin(&winner, 50, &mut rng).unwrap();
        assert!(reel.get(25).unwrap().same_identity(&winner));
    }

    let winner = sampler.sample(&mut rng);
    let odd = builder.build_spin(&winner, 51, &mut rng).unwrap();
    assert_eq!(odd.winning_index(), Some(25));
    assert_eq!(odd.len(), 51);
}

#[test]
fn delivered_item_is_the_centered_entry() {
    for seed in 0..20 {
        let (outcome, reel) = full_run(seed);
        let index = outcome.resolution.index().expect("centered resolution");
        assert_eq!(index, 25);
        assert_eq!(outcome.item, reel[index]);
        assert!(outcome.is_consistent());
    }
}

#[test]
fn no_ticks_after_done() {
    let config = RouletteConfig::default();
    let clock = ManualClock::new();
    let scheduler = QueuedScheduler::new();
    let mut controller = SpinController::new(config, clock.clone(), scheduler.clone())
        .unwrap()
        .with_seed(5);
    controller.start_spin(&weights(), &catalog()).unwrap();

    let mut resolved = false;
    while let Some(wake) = scheduler.take_next() {
        clock.advance(match wake {
            Wake::NextFrame => 16.0,
            Wake::After(ms) => ms,
        });
        if let TickResult::Resolved(_) = controller.on_tick() {
            resolved = true;
        }
    }
    assert!(resolved);

    let requested = scheduler.requested();
    for _ in 0..10 {
        clock.advance(10_000.0);
        assert_eq!(controller.on_tick(), TickResult::Idle);
    }
    assert_eq!(scheduler.requested(), requested);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn second_spin_is_rejected_without_touching_the_first() {
    let config = RouletteConfig::default();
    let runner = HeadlessRunner::for_config(&config);
    let mut controller = runner.controller(config, NullSink).unwrap().with_seed(8);

    controller.start_spin(&weights(), &catalog()).unwrap();
    for _ in 0..30 {
        runner.advance_one(&mut controller);
    }
    let session = controller.session().unwrap();
    let reel = session.sequence().clone();
    let sampled = session.authoritative().clone();
    let state = *session.driver().state();
    let requested = runner.scheduler().requested();

    assert_eq!(
        controller.start_spin(&weights(), &catalog()).err(),
        Some(RouletteError::ConcurrentSpinRejected)
    );

    let session = controller.session().unwrap();
    assert_eq!(session.sequence(), &reel);
    assert_eq!(session.authoritative(), &sampled);
    assert_eq!(session.driver().state(), &state);
    assert_eq!(session.phase(), SpinPhase::Running);
    assert_eq!(runner.scheduler().requested(), requested);

    let outcome = runner.run_until_resolved(&mut controller).unwrap();
    assert!(outcome.item.same_identity(&sampled));
}

#[test]
fn seeded_runs_are_identical() {
    let (a, reel_a) = full_run(1234);
    let (b, reel_b) = full_run(1234);
    assert_eq!(a, b);
    assert_eq!(reel_a, reel_b);

    let (c, reel_c) = full_run(4321);
    assert!(reel_a != reel_c || a.duration_ms != c.duration_ms);
}

#[test]
fn closing_mid_spin_delivers_the_sampled_item() {
    let config = RouletteConfig::default().with_timing(SpinTiming::turbo());
    let runner = HeadlessRunner::for_config(&config);
    let mut controller = runner
        .controller(config, SpinTrace::new("closed"))
        .unwrap()
        .with_seed(21);

    let mut ticket = controller.start_spin(&weights(), &catalog()).unwrap();
    let sampled = controller.session().unwrap().authoritative().clone();
    for _ in 0..20 {
        runner.advance_one(&mut controller);
    }

    assert_eq!(controller.request_close(), CloseDecision::NeedsConfirmation);
    let outcome = controller.confirm_close().unwrap();
    assert!(outcome.resolution.is_abandoned());
    assert_eq!(outcome.item, sampled);
    assert_eq!(ticket.try_outcome(), Some(Ok(outcome)));
    assert_eq!(controller.request_close(), CloseDecision::Closed);

    // Closing took the pending wake back from the host
    assert_eq!(runner.scheduler().pending(), 0);
    assert_eq!(runner.advance_one(&mut controller), None);

    let trace = controller.sink();
    let validation = trace.validate();
    assert!(validation.was_abandoned);
    assert!(validation.is_valid(), "{:?}", validation.warnings());
    assert_eq!(trace.phases().last(), Some(&SpinPhase::Idle));

    // The next spin runs on a single wake chain
    controller.start_spin(&weights(), &catalog()).unwrap();
    let mut max_pending = runner.scheduler().pending();
    while let Some(result) = runner.advance_one(&mut controller) {
        max_pending = max_pending.max(runner.scheduler().pending());
        if let TickResult::Resolved(_) = result {
            break;
        }
    }
    assert_eq!(max_pending, 1);
    assert!(!controller.is_spinning());
    assert_eq!(controller.sink().phases().last(), Some(&SpinPhase::Done));
}

#[test]
fn frames_follow_the_eased_curve() {
    let config = RouletteConfig::default();
    let geometry = ReelGeometry::mobile();
    let (start, end) = (geometry.start_offset(), geometry.offset_for(25));
    let runner = HeadlessRunner::for_config(&config);
    let mut controller = runner.controller(config, SpinTrace::new("frames")).unwrap().with_seed(3);

    controller.start_spin(&weights(), &catalog()).unwrap();
    runner.run_until_resolved(&mut controller).unwrap();
    let trace = controller.into_sink();

    let mut frames = 0;
    for event in &trace.events {
        if let cf_stage::SpinEventKind::Frame { offset, progress, .. } = event.kind {
            let expected = start + (end - start) * phased_progress(progress);
            assert!((offset - expected).abs() < 1e-6);
            frames += 1;
        }
    }
    assert!(frames > 150, "only {} frames", frames);
    assert_eq!(trace.final_offset(), Some(end));
    assert_eq!(trace.settled_index(), Some(25));
}
