//! Shared, dependency-light primitives reused across this workspace's
//! sequencing format crates: the little-endian offset codec, CIGAR operation
//! kinds, and the reference dictionary.

pub mod cigar;
pub mod primitive;
pub mod reference;

pub use cigar::{Kind as CigarKind, Op as CigarOp};
pub use reference::ReferenceTable;
