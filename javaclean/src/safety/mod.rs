//! Precondition analyses.
//!
//! Pure predicates invoked by the pattern finders to decide whether a
//! structurally-matching site is semantically safe to rewrite. They never
//! fail: "unsafe" and "cannot compute" are ordinary [`Verdict`] outcomes,
//! not errors.
//!
//! [`Verdict`]: crate::finder::Verdict

pub mod braces;
pub mod loop_shape;
