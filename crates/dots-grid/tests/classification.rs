//! Property tests over arbitrary program text.

use dots_core::{Direction, Position, RegionId};
use dots_grid::{CellKind, Loader, MemorySource};
use proptest::prelude::*;

const GLYPHS: &[char] = &[
    '.', '-', '|', '+', '/', '\\', '>', '<', '^', 'v', '(', ')', '*', '&', '#', '@', '$', '~',
    '!', '[', ']', '{', '}', '+', '%', '0', '5', '?', ' ', 'a', 'Z', '"', '`',
];

fn program() -> impl Strategy<Value = String> {
    let row = prop::collection::vec(prop::sample::select(GLYPHS), 0..16)
        .prop_map(|cells| cells.into_iter().collect::<String>());
    prop::collection::vec(row, 0..10).prop_map(|rows| rows.join("\n"))
}

proptest! {
    #[test]
    fn loading_never_panics(text in program()) {
        let _ = Loader::new(MemorySource::new()).load_str(&text, "");
    }

    #[test]
    fn main_region_mirrors_the_text(text in program()) {
        if let Ok(program) = Loader::new(MemorySource::new()).load_str(&text, "") {
            let world = &program.world;
            let grid = world.region(RegionId::MAIN).unwrap().grid();
            prop_assert_eq!(grid.height(), text.lines().count());
            for (y, line) in text.lines().enumerate() {
                prop_assert_eq!(grid.row_text(y), line);
            }
            prop_assert_eq!(world.classify(Position::main(-1, 0)), CellKind::Outside);
        }
    }

    #[test]
    fn every_seed_leaves_onto_track(text in program()) {
        if let Ok(program) = Loader::new(MemorySource::new()).load_str(&text, "") {
            for seed in &program.seeds {
                prop_assert_eq!(program.world.classify(seed.position), CellKind::Start);
                prop_assert!(program.world.connects(seed.position, seed.direction));
                let earlier = Direction::ALL
                    .into_iter()
                    .take_while(|&d| d != seed.direction);
                for dir in earlier {
                    prop_assert!(!program.world.connects(seed.position, dir));
                }
            }
        }
    }
}
