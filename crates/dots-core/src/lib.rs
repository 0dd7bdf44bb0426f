//! Core types for the dots grid interpreter.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the loader and the engine: identifiers,
//! grid geometry, the numeric values dots carry, and the two fatal
//! error families ([`LoadError`] and [`RuntimeFault`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod value;

pub use error::{LoadError, RuntimeFault};
pub use geometry::{Axis, Direction, Position};
pub use id::{DotId, RegionId, TickId};
pub use value::{Operator, Value};
