//! One-time tuning configuration for the engines.
//!
//! Environment-derived knobs are read exactly once into an immutable
//! [`Tuning`] value that engine constructors fold into their
//! per-instance parameters. Engines never consult the environment
//! themselves, so two instances built from different `Tuning` values
//! can coexist in one process.
//!
//! Recognized variables:
//!
//! - `FERROFLATE_CHAIN_LIMIT`: cap on hash-chain walks per match search.
//! - `FERROFLATE_NICE_MATCH`: early-exit match length for the searcher.
//! - `FERROFLATE_NO_FAST_PATH`: any non-empty value disables the
//!   decoder's fast literal/length/distance loop (diagnostic aid).

use std::env;

/// Immutable engine tuning, constructed once at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    /// Override for the match searcher's chain-walk budget.
    pub max_chain_override: Option<usize>,
    /// Override for the "nice match" early-exit threshold.
    pub nice_match_override: Option<usize>,
    /// Disable the decoder's fast path, forcing the checked slow path.
    pub disable_fast_path: bool,
}

impl Tuning {
    /// Tuning with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read tuning overrides from the environment.
    ///
    /// Unparseable values are ignored rather than failing construction.
    pub fn from_env() -> Self {
        Self {
            max_chain_override: env::var("FERROFLATE_CHAIN_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok()),
            nice_match_override: env::var("FERROFLATE_NICE_MATCH")
                .ok()
                .and_then(|v| v.parse().ok()),
            disable_fast_path: env::var("FERROFLATE_NO_FAST_PATH")
                .map(|v| !v.is_empty())
                .unwrap_or(false),
        }
    }
}
