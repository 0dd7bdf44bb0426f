//! Loading real program files from disk.

use std::path::{Path, PathBuf};

use dots_core::{Direction, LoadError, Position, RegionId};
use dots_grid::{CellKind, FsSource, Loader};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn caller_links_one_library_instance() {
    let program = Loader::new(FsSource).load_file(fixture("caller.dots")).unwrap();
    let world = &program.world;

    assert_eq!(world.regions().len(), 2);
    assert_eq!(world.library_instance_count(), 1);
    assert_eq!(program.seeds.len(), 1);
    assert_eq!(program.seeds[0].position, Position::main(0, 1));
    assert_eq!(program.seeds[0].direction, Direction::Right);

    let link = Position::main(4, 1);
    assert_eq!(world.classify(link), CellKind::LibraryLink('f'));
    let export = world.library_target(link).unwrap();
    assert_ne!(export.region, RegionId::MAIN);
    assert_eq!(world.classify(export), CellKind::LibraryExport('X'));
    assert_eq!(world.library_target(export), Some(link));
}

#[test]
fn library_region_remembers_its_file() {
    let program = Loader::new(FsSource).load_file(fixture("caller.dots")).unwrap();
    let library = &program.world.regions()[1];
    let source = library.source().unwrap();
    assert!(source.ends_with("lib/loop.dots"), "{}", source.display());
    assert_eq!(library.owner(), Some(Position::main(4, 1)));
}

#[test]
fn nested_library_paths_resolve_against_the_program_dir() {
    let program = Loader::new(FsSource).load_file(fixture("nested.dots")).unwrap();
    assert_eq!(program.world.regions().len(), 3);
    assert_eq!(program.world.library_instance_count(), 2);
}

#[test]
fn include_cycle_between_files() {
    let err = Loader::new(FsSource)
        .load_file(fixture("cycle_a.dots"))
        .unwrap_err();
    let LoadError::LibraryCycle { chain } = err else {
        panic!("expected a cycle, got {err}");
    };
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.first(), chain.last());
}

#[test]
fn missing_program_file() {
    let err = Loader::new(FsSource)
        .load_file(fixture("does-not-exist.dots"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("does-not-exist.dots"));
}
