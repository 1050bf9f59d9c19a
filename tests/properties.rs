//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Run bounds: any intent script keeps lives, combo and lane in range
//! - Score: never decreases while running
//! - Determinism: same seed + script gives the same event stream
//! - Boss schedule: every threshold bursts once, in order, after a warning
//! - Scoring math: orb awards follow the combo and risk multipliers
//! - Leaderboard: stays sorted and capped

use proptest::prelude::*;

use velocity_runner::consts::{COMBO_MAX, MAX_LIVES, SIM_DT};
use velocity_runner::highscores::MAX_HIGH_SCORES;
use velocity_runner::sim::{
    BossSignal, Control, DifficultyState, GameEvent, Intent, RunConfig, RunState, Simulation,
    WorldTheme, combine_seed, orb_award,
};
use velocity_runner::{HighScores, Tuning};

const INTENTS: [Intent; 5] = [
    Intent::LaneLeft,
    Intent::LaneRight,
    Intent::Jump,
    Intent::SlideBegin,
    Intent::Dash,
];

fn started(seed: u32, salt: u32) -> Simulation {
    let mut sim = Simulation::new(
        Tuning::default(),
        RunConfig {
            seed,
            salt,
            countdown_seconds: 0,
            ..RunConfig::default()
        },
    );
    sim.control(Control::Start);
    sim
}

/// Step `steps` times, queueing `script[i]` whenever step `i` has one
fn play(sim: &mut Simulation, script: &[Option<usize>], steps: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for i in 0..steps {
        if let Some(Some(idx)) = script.get(i) {
            sim.apply_intent(INTENTS[*idx]);
        }
        sim.step(SIM_DT).expect("step must not fault");
        events.extend(sim.drain_events());
    }
    events
}

fn script_strategy() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::weighted(0.15, 0usize..INTENTS.len()), 0..900)
}

// ============================================================
// Run Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_bounds_hold_under_any_script(seed in any::<u32>(), salt in any::<u32>(), script in script_strategy()) {
        let mut sim = started(seed, salt);
        let mut last_score = 0;
        for i in 0..900 {
            if let Some(Some(idx)) = script.get(i) {
                sim.apply_intent(INTENTS[*idx]);
            }
            prop_assert!(sim.step(SIM_DT).is_ok());

            let s = sim.session();
            prop_assert!(s.player.lives <= MAX_LIVES);
            prop_assert!(s.combo.count <= COMBO_MAX);
            prop_assert!(s.player.lane <= 2);
            prop_assert!(s.player.pos.is_finite());
            prop_assert!(s.score.score >= last_score, "score dropped at step {i}");
            last_score = s.score.score;
            if sim.state() == RunState::Dead {
                prop_assert_eq!(s.player.lives, 0);
                break;
            }
        }
    }

    #[test]
    fn prop_same_seed_same_run(seed in any::<u32>(), salt in any::<u32>(), script in script_strategy()) {
        let mut a = started(seed, salt);
        let mut b = started(seed, salt);
        let events_a = play(&mut a, &script, 600);
        let events_b = play(&mut b, &script, 600);
        prop_assert_eq!(events_a, events_b);
        prop_assert_eq!(a.session().score, b.session().score);
        prop_assert_eq!(&a.session().obstacles, &b.session().obstacles);
    }

    #[test]
    fn prop_paused_runs_do_not_move(seed in any::<u32>(), warmup in 1usize..200, idle in 1usize..200) {
        let mut sim = started(seed, 0);
        play(&mut sim, &[], warmup);
        if sim.state() == RunState::Running {
            sim.control(Control::Pause);
            let ticks = sim.session().ticks;
            let player = sim.session().player.clone();
            play(&mut sim, &[], idle);
            prop_assert_eq!(sim.session().ticks, ticks);
            prop_assert_eq!(&sim.session().player, &player);
        }
    }
}

// ============================================================
// Scoring Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_boss_thresholds_fire_once_in_order(steps in prop::collection::vec(0u64..=300, 1..200)) {
        let tuning = Tuning::default();
        let mut state = DifficultyState::new(&tuning);
        let mut score = 0;
        let mut warnings = Vec::new();
        let mut bursts = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            score += step;
            match state.check_boss(score, i as f64 * 16.0, &tuning) {
                BossSignal::Warning { threshold } => warnings.push(threshold),
                BossSignal::Burst { threshold, unannounced } => {
                    if unannounced {
                        warnings.push(threshold);
                    }
                    bursts.push(threshold);
                }
                BossSignal::None => {}
            }
        }

        let expected: Vec<u64> = (0..)
            .map(|k| tuning.boss_first_threshold + k * tuning.boss_threshold_step)
            .take_while(|t| *t <= score)
            .collect();
        prop_assert_eq!(&bursts, &expected);
        // Every burst is announced, even when the score skips the lead
        prop_assert!(warnings.len() >= bursts.len());
        prop_assert!(warnings.len() - bursts.len() <= 1);
        prop_assert_eq!(&warnings[..bursts.len()], &bursts[..]);
    }

    #[test]
    fn prop_orb_award_matches_multipliers(combo in 0u8..=12, risk in any::<bool>()) {
        let tuning = Tuning::default();
        let award = orb_award(combo, risk, &tuning);
        let mult = 1.0 + f64::from(combo.min(COMBO_MAX)) * 0.2;
        let expected = (10.0 * mult * if risk { 2.0 } else { 1.0 }).round() as u64;
        prop_assert_eq!(award, expected);
        prop_assert!(award >= 10 && award <= 40);
    }

    #[test]
    fn prop_salt_separates_runs(daily in any::<u32>(), a in any::<u32>(), b in any::<u32>()) {
        prop_assert_eq!(combine_seed(daily, a) == combine_seed(daily, b), a == b);
    }

    #[test]
    fn prop_leaderboard_sorted_and_capped(scores in prop::collection::vec(0u64..10_000, 0..40)) {
        let mut table = HighScores::new();
        for score in &scores {
            table.add_score(*score, WorldTheme::InkVoid, 7, 0.0);
        }
        prop_assert!(table.entries.len() <= MAX_HIGH_SCORES);
        prop_assert!(table.entries.windows(2).all(|w| w[0].score >= w[1].score));
        let best = scores.iter().copied().max().unwrap_or(0);
        if best > 0 {
            prop_assert_eq!(table.top_score(), Some(best));
        }
    }
}
