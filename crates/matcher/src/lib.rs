//! packgen-match: score registered scenarios against a structured
//! business analysis.
//!
//! The matcher is pure. It reads a catalog (see
//! `packgen_core::Registry::catalog`) and never touches the store; a
//! chosen match converts into a [`ScenarioSelection`] for the caller to
//! apply.
//!
//! [`ScenarioSelection`]: packgen_interchange::ScenarioSelection

pub mod matching;
pub mod score;
pub mod tables;

pub use matching::{
    find_matches, MatchResult, ScenarioMatch, INCLUSION_THRESHOLD, RECOMMENDATION_THRESHOLD,
};
pub use score::{score, ScoreBreakdown};
