//! The loaded world: every region plus the warp and library indices.

use std::path::{Path, PathBuf};

use dots_core::{Direction, Position, RegionId, RuntimeFault};
use indexmap::IndexMap;

use crate::cell::{Cell, CellKind};
use crate::grid::Grid;

// ── Region ──────────────────────────────────────────────────────

/// One independently scoped grid: the main program or a library instance.
#[derive(Clone, Debug)]
pub struct Region {
    id: RegionId,
    grid: Grid,
    scope: String,
    source: Option<PathBuf>,
    owner: Option<Position>,
}

impl Region {
    /// This region's id.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The classified cells.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Human-readable scope name (`<main>` or the library path).
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// File the region was loaded from, when known.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// For a library instance, the link cell that owns it.
    pub fn owner(&self) -> Option<Position> {
        self.owner
    }
}

// ── World ───────────────────────────────────────────────────────

/// All regions of a loaded program and the indices that connect them.
///
/// Built once by the [`Loader`](crate::Loader). Lookups never fail: any
/// coordinate outside a region (or in an unknown region) classifies as
/// [`CellKind::Outside`], so running off the grid is an ordinary
/// movement outcome for the engine.
#[derive(Clone, Debug, Default)]
pub struct World {
    regions: Vec<Region>,
    warps: IndexMap<Position, Position>,
    links: IndexMap<Position, Position>,
}

impl World {
    pub(crate) fn push_region(
        &mut self,
        grid: Grid,
        scope: String,
        source: Option<PathBuf>,
        owner: Option<Position>,
    ) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(Region {
            id,
            grid,
            scope,
            source,
            owner,
        });
        id
    }

    /// Record a bidirectional warp pair.
    pub(crate) fn pair_warp(&mut self, a: Position, b: Position) {
        self.warps.insert(a, b);
        self.warps.insert(b, a);
    }

    /// Record a link cell and the export cell of its library instance.
    pub(crate) fn link_library(&mut self, link: Position, export: Position) {
        self.links.insert(link, export);
        self.links.insert(export, link);
    }

    /// Every region, main program first.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// A region by id.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0 as usize)
    }

    /// The cell at `pos`, if it is inside a region.
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.region(pos.region)?.grid.get(pos.x, pos.y)
    }

    /// The semantic class of `pos`; [`CellKind::Outside`] off-grid.
    pub fn classify(&self, pos: Position) -> CellKind {
        self.cell(pos).map_or(CellKind::Outside, |c| c.kind)
    }

    /// The raw glyph at `pos`, if inside.
    pub fn glyph(&self, pos: Position) -> Option<char> {
        self.cell(pos).map(|c| c.glyph)
    }

    /// The adjacent position in `dir`. May be outside.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Position {
        pos.step(dir)
    }

    /// Whether a dot leaving `pos` towards `dir` lands on a cell that
    /// accepts it.
    pub fn connects(&self, pos: Position, dir: Direction) -> bool {
        self.classify(self.neighbor(pos, dir)).accepts(dir)
    }

    /// The other end of the warp at `pos`.
    pub fn warp_partner(&self, pos: Position) -> Option<Position> {
        self.warps.get(&pos).copied()
    }

    /// Where a library link or export cell leads.
    pub fn library_target(&self, pos: Position) -> Option<Position> {
        self.links.get(&pos).copied()
    }

    /// Number of warp cells that have a partner.
    pub fn warp_cell_count(&self) -> usize {
        self.warps.len()
    }

    /// Number of library instances.
    pub fn library_instance_count(&self) -> usize {
        self.links.len() / 2
    }

    /// Total number of cells over all regions.
    pub fn cell_count(&self) -> usize {
        self.regions.iter().map(|r| r.grid.cells().count()).sum()
    }

    /// Replace the glyph at `pos` and reclassify it with the fixed
    /// symbol table. Returns the new kind.
    ///
    /// Warp and library indices are left untouched: rewriting a linked
    /// cell leaves a dangling entry that the engine reports if a dot
    /// ever relies on it.
    pub fn rewrite(&mut self, pos: Position, glyph: char) -> Result<CellKind, RuntimeFault> {
        let cell = self
            .regions
            .get_mut(pos.region.0 as usize)
            .and_then(|r| r.grid.get_mut(pos.x, pos.y))
            .ok_or(RuntimeFault::OutsideGrid { at: pos })?;
        *cell = Cell::plain(glyph);
        Ok(cell.kind)
    }
}
