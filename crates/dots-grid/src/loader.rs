//! Program loading: directives, library instancing, warp pairing, seeding.
//!
//! # Library instancing
//!
//! Every occurrence of an include's glyph in the including grid gets a
//! private copy of the library loaded into its own region. A dot that
//! steps onto the occurrence appears on the library's export cell; a dot
//! that steps onto the export cell returns to the occurrence that owns
//! the instance. Libraries are resolved against the program directory,
//! recursively, and a file that is already being loaded further up the
//! include chain is rejected as a cycle.

use std::path::{Path, PathBuf};

use dots_core::{Direction, LoadError, Position, RegionId};
use tracing::{debug, warn};

use crate::cell::CellKind;
use crate::directive::SourceText;
use crate::source::SourceProvider;
use crate::world::World;

const MAIN_SCOPE: &str = "<main>";

// ── LoaderConfig ────────────────────────────────────────────────

/// Loader limits.
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Upper bound on library instances across the whole include tree.
    /// Default: 1024.
    pub max_library_instances: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_library_instances: 1024,
        }
    }
}

// ── LoadedProgram ───────────────────────────────────────────────

/// Where a dot starts and which way it initially heads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seed {
    /// The start marker.
    pub position: Position,
    /// Direction implied by the marker's adjacent track.
    pub direction: Direction,
}

/// Result of a successful load.
#[derive(Clone, Debug)]
pub struct LoadedProgram {
    /// The immutable classified world.
    pub world: World,
    /// One seed per start marker of the main program, row-major.
    pub seeds: Vec<Seed>,
}

// ── Loader ──────────────────────────────────────────────────────

/// Builds a [`World`] from program text.
#[derive(Clone, Debug)]
pub struct Loader<P> {
    provider: P,
    config: LoaderConfig,
}

struct Build<'a, P> {
    provider: &'a P,
    config: &'a LoaderConfig,
    program_dir: PathBuf,
    world: World,
    stack: Vec<PathBuf>,
    instances: usize,
}

impl<P: SourceProvider> Loader<P> {
    /// A loader with default limits.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, LoaderConfig::default())
    }

    /// A loader with explicit limits.
    pub fn with_config(provider: P, config: LoaderConfig) -> Self {
        Self { provider, config }
    }

    /// Load the program file at `path`. Libraries resolve relative to
    /// the file's directory.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedProgram, LoadError> {
        let path = path.as_ref();
        let text = self.provider.read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let identity = self.provider.identity(path);
        self.load(&text, dir, Some(identity))
    }

    /// Load program text whose libraries resolve relative to `base_dir`.
    pub fn load_str(
        &self,
        text: &str,
        base_dir: impl AsRef<Path>,
    ) -> Result<LoadedProgram, LoadError> {
        self.load(text, base_dir.as_ref().to_path_buf(), None)
    }

    fn load(
        &self,
        text: &str,
        program_dir: PathBuf,
        identity: Option<PathBuf>,
    ) -> Result<LoadedProgram, LoadError> {
        let mut build = Build {
            provider: &self.provider,
            config: &self.config,
            program_dir,
            world: World::default(),
            stack: identity.into_iter().collect(),
            instances: 0,
        };
        let source = build.stack.first().cloned();
        build.add_region(text, MAIN_SCOPE.to_string(), source, None)?;

        let seeds = seed_dots(&build.world)?;
        debug!(
            regions = build.world.regions().len(),
            library_instances = build.instances,
            seeds = seeds.len(),
            "program loaded"
        );
        Ok(LoadedProgram {
            world: build.world,
            seeds,
        })
    }
}

impl<P: SourceProvider> Build<'_, P> {
    /// Load one file into a new region. `owner` is the link cell for a
    /// library instance, `None` for the main program. Returns the
    /// region id and, for libraries, the export cell.
    fn add_region(
        &mut self,
        text: &str,
        scope: String,
        source: Option<PathBuf>,
        owner: Option<Position>,
    ) -> Result<(RegionId, Option<Position>), LoadError> {
        let parsed = SourceText::parse(text, &scope)?;
        let is_library = owner.is_some();

        let export_glyph = match (is_library, parsed.directives.export) {
            (true, Some(glyph)) => Some(glyph),
            (true, None) => {
                return Err(LoadError::MissingExport {
                    library: source.clone().unwrap_or_else(|| PathBuf::from(&scope)),
                })
            }
            (false, Some(glyph)) => {
                warn!(%glyph, "export directive ignored in main program");
                None
            }
            (false, None) => None,
        };

        let grid = parsed.classify(export_glyph);
        let region = self
            .world
            .push_region(grid.clone(), scope.clone(), source.clone(), owner);

        for &glyph in &parsed.directives.warps {
            let cells = grid.find(|k| k == CellKind::Warp(glyph));
            match cells.as_slice() {
                [] => warn!(scope = %scope, %glyph, "declared warp never used"),
                [(ax, ay), (bx, by)] => self.world.pair_warp(
                    Position::new(region, *ax, *ay),
                    Position::new(region, *bx, *by),
                ),
                _ => {
                    return Err(LoadError::UnpairedWarp {
                        scope,
                        glyph,
                        found: cells.len(),
                    })
                }
            }
        }

        let export = match export_glyph {
            Some(glyph) => {
                let cells = grid.find(|k| k == CellKind::LibraryExport(glyph));
                let [(x, y)] = cells.as_slice() else {
                    return Err(LoadError::ExportCount {
                        library: source.unwrap_or_else(|| PathBuf::from(&scope)),
                        glyph,
                        found: cells.len(),
                    });
                };
                Some(Position::new(region, *x, *y))
            }
            None => None,
        };

        for include in &parsed.directives.includes {
            let path = self.program_dir.join(&include.path);
            let identity = self.provider.identity(&path);
            if self.stack.contains(&identity) {
                let mut chain = self.stack.clone();
                chain.push(identity);
                return Err(LoadError::LibraryCycle { chain });
            }
            let lib_text = self.provider.read(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;

            let links = grid.find(|k| k == CellKind::LibraryLink(include.glyph));
            if links.is_empty() {
                warn!(library = %path.display(), glyph = %include.glyph, "included library never used");
            }

            self.stack.push(identity.clone());
            for (x, y) in links {
                self.instances += 1;
                if self.instances > self.config.max_library_instances {
                    return Err(LoadError::TooManyInstances {
                        limit: self.config.max_library_instances,
                    });
                }
                let link = Position::new(region, x, y);
                let (instance, lib_export) = self.add_region(
                    &lib_text,
                    include.path.display().to_string(),
                    Some(identity.clone()),
                    Some(link),
                )?;
                let lib_export = lib_export.ok_or_else(|| LoadError::MissingExport {
                    library: path.clone(),
                })?;
                debug!(%link, %instance, library = %path.display(), "library instance linked");
                self.world.link_library(link, lib_export);
            }
            self.stack.pop();
        }

        Ok((region, export))
    }
}

/// Seed a dot on every start marker of the main region.
fn seed_dots(world: &World) -> Result<Vec<Seed>, LoadError> {
    let Some(main) = world.region(RegionId::MAIN) else {
        return Ok(Vec::new());
    };
    main.grid()
        .find(|k| k == CellKind::Start)
        .into_iter()
        .map(|(x, y)| {
            let position = Position::main(x, y);
            Direction::ALL
                .into_iter()
                .find(|&dir| world.connects(position, dir))
                .map(|direction| Seed {
                    position,
                    direction,
                })
                .ok_or(LoadError::DetachedStart { x, y })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn load(text: &str) -> Result<LoadedProgram, LoadError> {
        Loader::new(MemorySource::new()).load_str(text, "")
    }

    #[test]
    fn seeds_pick_first_connecting_direction() {
        let program = load(" | \n-.-\n").unwrap();
        assert_eq!(
            program.seeds,
            vec![Seed {
                position: Position::main(1, 1),
                direction: Direction::Up,
            }]
        );
    }

    #[test]
    fn seeds_are_row_major() {
        let program = load(".-\n\n.-").unwrap();
        let ys: Vec<i32> = program.seeds.iter().map(|s| s.position.y).collect();
        assert_eq!(ys, vec![0, 2]);
    }

    #[test]
    fn detached_start_is_rejected() {
        assert!(matches!(
            load(" . -"),
            Err(LoadError::DetachedStart { x: 1, y: 0 })
        ));
    }

    #[test]
    fn start_does_not_leave_across_perpendicular_track() {
        assert!(matches!(load(".|"), Err(LoadError::DetachedStart { .. })));
    }

    #[test]
    fn empty_program_has_no_seeds() {
        let program = load("").unwrap();
        assert!(program.seeds.is_empty());
        assert_eq!(program.world.regions().len(), 1);
    }

    #[test]
    fn warps_pair_within_scope() {
        let program = load("%$AB\n.-A B-\n  A B").unwrap();
        let w = &program.world;
        assert_eq!(w.warp_partner(Position::main(2, 1)), Some(Position::main(2, 2)));
        assert_eq!(w.warp_partner(Position::main(4, 1)), Some(Position::main(4, 2)));
        assert_eq!(w.warp_cell_count(), 4);
    }

    #[test]
    fn single_warp_is_a_load_error() {
        assert!(matches!(
            load("%$A\n.-A"),
            Err(LoadError::UnpairedWarp {
                glyph: 'A',
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn triple_warp_is_a_load_error() {
        assert!(matches!(
            load("%$A\n.-A A A"),
            Err(LoadError::UnpairedWarp { found: 3, .. })
        ));
    }

    #[test]
    fn unused_warp_declaration_is_tolerated() {
        assert!(load("%$Q\n.-&").is_ok());
    }

    #[test]
    fn each_link_gets_its_own_instance() {
        let src = MemorySource::new().with_file("lib.dots", "%^X\n-X-\n");
        let program = Loader::new(src)
            .load_str("%!lib.dots f\n.-f-f-", "")
            .unwrap();
        let w = &program.world;
        assert_eq!(w.regions().len(), 3);
        assert_eq!(w.library_instance_count(), 2);
        let first = Position::main(2, 1);
        let second = Position::main(4, 1);
        let a = w.library_target(first).unwrap();
        let b = w.library_target(second).unwrap();
        assert_ne!(a.region, b.region);
        assert_eq!(w.library_target(a), Some(first));
        assert_eq!(w.library_target(b), Some(second));
        assert_eq!(w.region(a.region).unwrap().owner(), Some(first));
    }

    #[test]
    fn library_start_markers_are_not_seeded() {
        let src = MemorySource::new().with_file("lib.dots", "%^X\n.-X\n");
        let program = Loader::new(src).load_str("%!lib.dots f\n.-f", "").unwrap();
        assert_eq!(program.seeds.len(), 1);
        assert_eq!(program.seeds[0].position.region, RegionId::MAIN);
    }

    #[test]
    fn missing_library_is_io_error() {
        assert!(matches!(
            load("%!nowhere.dots f\n.-f"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn library_without_export_is_rejected() {
        let src = MemorySource::new().with_file("lib.dots", "-X-\n");
        assert!(matches!(
            Loader::new(src).load_str("%!lib.dots f\n.-f", ""),
            Err(LoadError::MissingExport { .. })
        ));
    }

    #[test]
    fn export_must_occur_once() {
        let src = MemorySource::new().with_file("lib.dots", "%^X\n-X-X\n");
        assert!(matches!(
            Loader::new(src).load_str("%!lib.dots f\n.-f", ""),
            Err(LoadError::ExportCount { found: 2, .. })
        ));
    }

    #[test]
    fn self_include_is_a_cycle() {
        let src = MemorySource::new().with_file("main.dots", "%!main.dots f\n.-f");
        assert!(matches!(
            Loader::new(src).load_file("main.dots"),
            Err(LoadError::LibraryCycle { .. })
        ));
    }

    #[test]
    fn mutual_include_is_a_cycle() {
        let src = MemorySource::new()
            .with_file("a.dots", "%^X\n%!b.dots g\n-X-g")
            .with_file("b.dots", "%^Y\n%!a.dots h\n-Y-h");
        let err = Loader::new(src)
            .load_str("%!a.dots f\n.-f", "")
            .unwrap_err();
        let LoadError::LibraryCycle { chain } = err else {
            panic!("expected cycle, got {err}");
        };
        assert_eq!(
            chain,
            vec![
                PathBuf::from("a.dots"),
                PathBuf::from("b.dots"),
                PathBuf::from("a.dots")
            ]
        );
    }

    #[test]
    fn instance_limit_is_enforced() {
        let src = MemorySource::new().with_file("lib.dots", "%^X\n-X-\n");
        let loader = Loader::with_config(
            src,
            LoaderConfig {
                max_library_instances: 1,
            },
        );
        assert!(matches!(
            loader.load_str("%!lib.dots f\n.-f-f", ""),
            Err(LoadError::TooManyInstances { limit: 1 })
        ));
    }

    #[test]
    fn nested_libraries_resolve_against_program_dir() {
        let src = MemorySource::new()
            .with_file("progs/outer.dots", "%^X\n%!inner.dots g\n-X-g-")
            .with_file("progs/inner.dots", "%^Y\n-Y-");
        let program = Loader::new(src)
            .load_str("%!outer.dots f\n.-f", "progs")
            .unwrap();
        assert_eq!(program.world.regions().len(), 3);
        assert_eq!(program.world.library_instance_count(), 2);
    }

    #[test]
    fn load_file_resolves_relative_to_file() {
        let src = MemorySource::new()
            .with_file("dir/main.dots", "%!lib.dots f\n.-f")
            .with_file("dir/lib.dots", "%^X\n-X");
        let program = Loader::new(src).load_file("dir/main.dots").unwrap();
        assert_eq!(program.world.library_instance_count(), 1);
        assert_eq!(
            program.world.region(RegionId::MAIN).unwrap().source(),
            Some(Path::new("dir/main.dots"))
        );
    }
}
