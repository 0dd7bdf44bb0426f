//! Identical program, configuration and input give identical runs.

use dots_core::RuntimeFault;
use dots_engine::{Engine, ExecutionMode, RunConfig, RunOutcome};
use dots_grid::{Loader, MemorySource};
use dots_test_utils::{MicrotickRecord, RecordingIo};
use proptest::prelude::*;

const GLYPHS: &[char] = &[
    '.', '.', '-', '-', '-', '|', '|', '|', '+', '/', '\\', '>', '<', '^', 'v', '(', ')', '*',
    '&', '#', '@', '$', '~', '[', ']', '{', '}', '0', '1', '7', '?', ' ', ' ', 'a', '"',
];

fn grid_strategy() -> impl Strategy<Value = String> {
    let row = prop::collection::vec(prop::sample::select(GLYPHS), 1..12)
        .prop_map(|cells| cells.into_iter().collect::<String>());
    prop::collection::vec(row, 1..8).prop_map(|rows| rows.join("\n"))
}

#[derive(Debug, PartialEq)]
struct Trace {
    result: Result<(RunOutcome, u64, usize, u64), RuntimeFault>,
    texts: Vec<String>,
    microticks: Vec<MicrotickRecord>,
    errors: Vec<String>,
    finishes: usize,
}

fn trace(text: &str, mode: ExecutionMode) -> Option<Trace> {
    let program = Loader::new(MemorySource::new()).load_str(text, "").ok()?;
    let config = RunConfig {
        mode,
        tick_limit: Some(150),
        output_limit: Some(50),
        max_live_dots: 64,
        ..RunConfig::default()
    };
    let mut engine = Engine::new(program, config).ok()?;
    let mut io = RecordingIo::with_input(["3", "x"]);
    let result = engine
        .run(&mut io)
        .map(|r| (r.outcome, r.ticks, r.outputs, r.dots_spawned));
    Some(Trace {
        result,
        texts: io.texts().into_iter().map(String::from).collect(),
        microticks: io.microticks,
        errors: io.errors,
        finishes: io.finishes,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn repeated_runs_match(text in grid_strategy(), lockstep in any::<bool>()) {
        let mode = if lockstep { ExecutionMode::Lockstep } else { ExecutionMode::Sequential };
        let first = trace(&text, mode);
        let second = trace(&text, mode);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_run_finishes_exactly_once(text in grid_strategy()) {
        if let Some(t) = trace(&text, ExecutionMode::Sequential) {
            prop_assert_eq!(t.finishes, 1);
            prop_assert!(t.errors.len() <= 1);
            prop_assert_eq!(t.errors.len() == 1, t.result.is_err());
            if let Ok((_, ticks, outputs, _)) = t.result {
                prop_assert!(ticks <= 150);
                prop_assert!(outputs <= 50);
                prop_assert!(t.microticks.iter().all(|m| m.tick >= 1 && m.tick <= ticks));
            }
        }
    }
}
