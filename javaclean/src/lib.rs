//! Core library for the javaclean source clean-up engine.
//!
//! The engine takes a resolved Java syntax tree plus a set of enabled
//! clean-up options and computes a conflict-free set of textual fixes:
//! brace normalization, indexed-loop conversion, string concatenation
//! merging, and if-chain to switch conversion. Fixes are previewable and
//! carry linked rename proposals for names the rewrites introduce.

// Allow common complexity warnings - these are intentional design choices
#![allow(
    clippy::type_complexity,
    clippy::similar_names,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module defining the resolved syntax tree the engine consumes.
/// This includes statements, expressions, types, and the binding table.
pub mod ast;

/// Module for comment scanning and comment-preservation checks.
pub mod comments;

/// Module for loading configuration.
pub mod config;

/// Module defining rewrite operations, edit scripts, and the text buffer
/// that realizes them against the original source.
pub mod edit;

/// Module containing the pattern finders.
/// Each transformation family implements the `CleanUp` trait here.
pub mod finder;

/// Module aggregating per-family edit scripts into one file-level result.
pub mod fixer;

/// Module containing re-indentation helpers for spliced text.
pub mod format;

/// Module tracking import requirements recorded by rewrites.
pub mod imports;

/// Module proposing names for variables the rewrites introduce.
pub mod naming;

/// Module containing the safety analyses behind the finders.
/// These decide whether a structurally-matched site may be rewritten.
pub mod safety;

/// Module containing test utilities.
/// This provides a small Java parser for building test trees.
pub mod test_utils;

/// Module containing utility functions.
pub mod utils;
