//! # System Module
//!
//! Stage resolution and progress toward the next stage.
//!
//! Resolution is pure and deterministic: it reads a snapshot and a catalog
//! and nothing else.

mod stage;

pub use stage::*;
