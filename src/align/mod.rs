//! Eye alignment: transform solving and the per-export reference.

/// Set-once canvas eye reference.
pub mod reference;
/// Similarity transform solver.
pub mod solver;
