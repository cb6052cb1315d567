///! Channel name synthesizer - license record to unique radio channel name

use std::collections::HashSet;
use tracing::debug;
use uls_common::{LicenseRecord, PrefixPolicy, SuffixPolicy};

use super::classifier::{
    self, DEFAULT_SUFFIX_CUTOFF, DEFAULT_SUFFIX_FALLBACK, PrefixOverride, abbreviate_county, city_prefix,
};
use super::registry::{Assignment, ChannelNameRegistry};
use crate::error::{Result, UlsError};

/// Run-scoped naming configuration
#[derive(Debug, Clone)]
pub struct NamingConfig {
    pub prefix: PrefixPolicy,
    pub suffix: SuffixPolicy,
    /// Maximum channel name length, in characters
    pub max_length: usize,
    pub suffix_cutoff: usize,
    pub suffix_fallback: String,
    /// Upper-case words ignored by the fallback acronym
    pub excluded_words: HashSet<String>,
}

impl NamingConfig {
    pub fn new(prefix: PrefixPolicy, suffix: SuffixPolicy, max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(UlsError::Configuration("channel name length must be positive".to_string()));
        }

        Ok(Self {
            prefix,
            suffix,
            max_length,
            suffix_cutoff: DEFAULT_SUFFIX_CUTOFF,
            suffix_fallback: DEFAULT_SUFFIX_FALLBACK.to_string(),
            excluded_words: HashSet::new(),
        })
    }
}

/// Synthesizes channel names for one export run.
///
/// Owns the collision registry, so a fresh synthesizer is needed per run.
#[derive(Debug)]
pub struct ChannelNameSynthesizer {
    config: NamingConfig,
    registry: ChannelNameRegistry,
}

impl ChannelNameSynthesizer {
    pub fn new(config: NamingConfig) -> Self {
        let registry = ChannelNameRegistry::new(config.max_length);
        Self { config, registry }
    }

    /// Name before collision handling: prefix + suffix, upper-cased,
    /// alphanumerics only, cut to the maximum length.
    pub fn base_name(&self, record: &LicenseRecord) -> String {
        let mut prefix = match &self.config.prefix {
            PrefixPolicy::Auto | PrefixPolicy::City => city_prefix(&record.city),
            PrefixPolicy::Callsign => record.call_sign.clone(),
            PrefixPolicy::Literal(s) => s.clone(),
        };

        let suffix = match &self.config.suffix {
            SuffixPolicy::Freq => record.frequency.clone(),
            SuffixPolicy::Literal(s) => s.clone(),
            SuffixPolicy::Auto => match classifier::classify(&record.entity_name, &record.eligibility) {
                Some(rule) => {
                    let mut suffix = rule.suffix.to_string();
                    if self.config.prefix.is_auto() {
                        match rule.prefix_override {
                            PrefixOverride::State => prefix = record.state.clone(),
                            PrefixOverride::County if !record.county.trim().is_empty() => {
                                prefix = String::new();
                                suffix = abbreviate_county(&record.county) + &suffix;
                            }
                            _ => {}
                        }
                    }
                    suffix
                }
                None => classifier::acronym_suffix(
                    &record.entity_name,
                    self.config.suffix_cutoff,
                    &self.config.suffix_fallback,
                    &self.config.excluded_words,
                ),
            },
        };

        debug!("Channel name parts for {:?}: prefix {:?}, suffix {:?}", record.entity_name, prefix, suffix);

        (prefix + &suffix)
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            .take(self.config.max_length)
            .collect()
    }

    /// Assign a unique name to the record at output position `index`.
    pub fn assign(&mut self, record: &LicenseRecord, index: usize) -> Assignment {
        let base = self.base_name(record);
        self.registry.register(&base, index)
    }
}
