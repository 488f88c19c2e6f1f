//! # lexbloom
//!
//! Per-corpus Bloom filters sized from unique word counts.
//!
//! ## Features
//!
//! - Whitespace tokenization with bounded token length
//! - Order-preserving deduplication
//! - Bit array sizing for a target false positive rate
//! - One independent pipeline per corpus on a worker pool
//! - Run-wide totals reduced after every pipeline finishes

pub mod analysis;
pub mod bloom;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod parallel_build;
pub mod report;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
