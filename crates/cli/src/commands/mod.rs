pub(crate) mod generate;
pub(crate) mod packs;
pub(crate) mod scenario_match;
pub(crate) mod snapshot;
pub(crate) mod state;
pub(crate) mod validate;
