///! Channel name synthesis
///!
///! Turns license records into short, unique channel identifiers for radio
///! programming exports.

mod classifier;
pub use classifier::{
    DEFAULT_SUFFIX_CUTOFF, DEFAULT_SUFFIX_FALLBACK, PrefixOverride, SUFFIX_RULES, SuffixRule, abbreviate_county,
    acronym_suffix, city_prefix, classify,
};

mod registry;
pub use registry::{Assignment, ChannelNameRegistry, RetroRename};

mod synthesizer;
pub use synthesizer::{ChannelNameSynthesizer, NamingConfig};
