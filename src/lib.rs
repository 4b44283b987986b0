//! ravenmatrix - Progressive-matrix reasoning puzzles
//!
//! This library provides functionality to:
//! - Generate 3×3 matrix puzzles whose difficulty follows a per-level complexity table
//! - Decide when two visual elements are indistinguishable to a viewer
//! - Score response logs on a bounded, mean-centered scale
//! - Run multi-level test sessions and single-puzzle-per-level ladders

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod element;
pub mod generator;
pub mod ladder;
pub mod patterns;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;
