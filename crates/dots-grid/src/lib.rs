//! Grid loading and world representation for the dots interpreter.
//!
//! A program is plain text. The [`Loader`] reads it (and any libraries
//! it includes) through a [`SourceProvider`], classifies every
//! character into a [`CellKind`] exactly once, links warps and library
//! instances, and hands back an immutable [`World`] together with the
//! [`Seed`]s from which the engine creates its initial dots.
//!
//! # Layout
//!
//! - [`cell`]: glyph classification table.
//! - [`grid`]: one ragged rectangle of classified cells.
//! - [`world`]: all regions plus the warp and library indices.
//! - [`loader`]: directive handling, library instancing, seeding.
//! - [`source`]: where program text comes from.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub(crate) mod directive;
pub mod grid;
pub mod loader;
pub mod source;
pub mod world;

pub use cell::{Cell, CellKind, Mirror, OperatorStyle};
pub use grid::Grid;
pub use loader::{LoadedProgram, Loader, LoaderConfig, Seed};
pub use source::{FsSource, MemorySource, SourceProvider};
pub use world::{Region, World};
