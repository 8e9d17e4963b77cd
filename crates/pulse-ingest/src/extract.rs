//! Heuristic extraction over chat text.
//!
//! Turns a message into topic candidates and lead-scoring signals using
//! regex patterns, fixed phrase sets and an alias table. No model calls.

pub mod signals;
pub mod text;
pub mod tokens;
