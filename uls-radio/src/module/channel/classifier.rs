///! Channel name classifier - prefix and suffix derivation
///!
///! Suffixes come from an ordered keyword rule list over the entity name and
///! eligibility text; the first matching rule wins. Some rules also replace
///! the prefix with the state or county abbreviation.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Fallback acronym length
pub const DEFAULT_SUFFIX_CUTOFF: usize = 3;

/// Suffix used when the fallback acronym comes out empty
pub const DEFAULT_SUFFIX_FALLBACK: &str = "Q";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("static regex"));

/// Prefix replacement requested by a matching rule (prefix policy `auto` only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOverride {
    None,
    /// Use the state abbreviation as prefix
    State,
    /// Drop the prefix and lead the suffix with the county abbreviation
    County,
}

/// One keyword rule
#[derive(Debug)]
pub struct SuffixRule {
    /// Every keyword must appear
    pub all: &'static [&'static str],
    /// At least one must appear (ignored when empty)
    pub any: &'static [&'static str],
    /// None may appear
    pub none: &'static [&'static str],
    pub suffix: &'static str,
    pub prefix_override: PrefixOverride,
}

impl SuffixRule {
    const fn new(all: &'static [&'static str], suffix: &'static str) -> Self {
        Self {
            all,
            any: &[],
            none: &[],
            suffix,
            prefix_override: PrefixOverride::None,
        }
    }

    const fn any_of(mut self, any: &'static [&'static str]) -> Self {
        self.any = any;
        self
    }

    const fn none_of(mut self, none: &'static [&'static str]) -> Self {
        self.none = none;
        self
    }

    const fn prefix(mut self, prefix_override: PrefixOverride) -> Self {
        self.prefix_override = prefix_override;
        self
    }

    /// `text` must already be upper-cased
    pub fn matches(&self, text: &str) -> bool {
        self.all.iter().all(|k| text.contains(k))
            && (self.any.is_empty() || self.any.iter().any(|k| text.contains(k)))
            && !self.none.iter().any(|k| text.contains(k))
    }
}

/// Classification rules in priority order
pub static SUFFIX_RULES: [SuffixRule; 14] = [
    SuffixRule::new(&["POLICE", "STATE"], "SPD").prefix(PrefixOverride::State),
    SuffixRule::new(&["POLICE"], "UNPD").any_of(&["CAMPUS", "UNIVERSITY", "COLLEGE"]),
    SuffixRule::new(&["POLICE"], "PD"),
    SuffixRule::new(&["HIGHWAY PATROL"], "HP").prefix(PrefixOverride::State),
    SuffixRule::new(&["SHERIFF"], "SHF").prefix(PrefixOverride::County),
    SuffixRule::new(&["FIRE", "EMERGENCY"], "FEMS")
        .none_of(&["NON EMERGENCY"])
        .prefix(PrefixOverride::County),
    SuffixRule::new(&["EMERGENCY"], "EMS")
        .none_of(&["NON EMERGENCY"])
        .prefix(PrefixOverride::County),
    SuffixRule::new(&["FIRE", "DEPARTMENT"], "FD"),
    SuffixRule::new(&["FIRE", "DISTRICT"], "FDT"),
    SuffixRule::new(&[], "SWAT").any_of(&["SWAT", "S.W.A.T"]),
    SuffixRule::new(&["TRANSIT AUTHORITY"], "TA"),
    SuffixRule::new(&["DEPARTMENT OF TRANSPORTATION"], "DOT").prefix(PrefixOverride::State),
    SuffixRule::new(&["PORT AUTHORITY"], "PA"),
    SuffixRule::new(&["PARKS AND RECREATION"], "PAR"),
];

/// First rule matching entity name + eligibility text, case-insensitive
pub fn classify(entity: &str, eligibility: &str) -> Option<&'static SuffixRule> {
    let text = format!("{} {}", entity, eligibility).to_uppercase();
    SUFFIX_RULES.iter().find(|rule| rule.matches(&text))
}

/// City abbreviation: one word gives its first two characters, two or more
/// give the initials of the first (up to) three words.
pub fn city_prefix(city: &str) -> String {
    let city = city.to_uppercase();
    let words: Vec<&str> = city.split_whitespace().collect();

    match words.as_slice() {
        [] => String::new(),
        [word] => word.chars().take(2).collect(),
        words => words.iter().take(3).filter_map(|w| w.chars().next()).collect(),
    }
}

/// County abbreviation: initials of the first two words (or the first
/// letter of a single word) followed by "C".
pub fn abbreviate_county(county: &str) -> String {
    let initials: String = county
        .split_whitespace()
        .take(2)
        .filter_map(|w| w.chars().next())
        .collect();
    initials + "C"
}

/// Fallback suffix: initials of the entity name words, cut to `cutoff`
/// characters, or `fallback` when nothing is left.
pub fn acronym_suffix(entity: &str, cutoff: usize, fallback: &str, excluded: &HashSet<String>) -> String {
    let entity = entity.to_uppercase();
    let acronym: String = NON_WORD
        .split(&entity)
        .filter(|w| !w.is_empty() && !excluded.contains(*w))
        .filter_map(|w| w.chars().next())
        .take(cutoff)
        .collect();

    if acronym.is_empty() {
        fallback.to_string()
    } else {
        acronym
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffix_of(entity: &str, eligibility: &str) -> Option<&'static str> {
        classify(entity, eligibility).map(|r| r.suffix)
    }

    #[test]
    fn test_city_prefix() {
        assert_eq!(city_prefix("Springfield"), "SP");
        assert_eq!(city_prefix("New York"), "NY");
        assert_eq!(city_prefix("SALT LAKE CITY"), "SLC");
        assert_eq!(city_prefix("a b c d"), "ABC");
        assert_eq!(city_prefix("  "), "");
        assert_eq!(city_prefix("X"), "X");
    }

    #[test]
    fn test_abbreviate_county() {
        assert_eq!(abbreviate_county("WASHINGTON COUNTY"), "WCC");
        assert_eq!(abbreviate_county("SANGAMON"), "SC");
        assert_eq!(abbreviate_county("ST LOUIS CITY"), "SLC");
        assert_eq!(abbreviate_county(""), "C");
    }

    #[test]
    fn test_rule_priority() {
        assert_eq!(suffix_of("STATE POLICE", ""), Some("SPD"));
        assert_eq!(suffix_of("UNIVERSITY OF X", "police department"), Some("UNPD"));
        assert_eq!(suffix_of("CITY OF SPRINGFIELD POLICE DEPARTMENT", "MUNICIPAL"), Some("PD"));
        assert_eq!(suffix_of("CALIFORNIA HIGHWAY PATROL", ""), Some("HP"));
        assert_eq!(suffix_of("COUNTY SHERIFF OFFICE", ""), Some("SHF"));
        assert_eq!(suffix_of("FIRE AND EMERGENCY SERVICES", ""), Some("FEMS"));
        assert_eq!(suffix_of("COUNTY EMERGENCY MANAGEMENT", ""), Some("EMS"));
        assert_eq!(suffix_of("TOWN FIRE DEPARTMENT", ""), Some("FD"));
        assert_eq!(suffix_of("RURAL FIRE PROTECTION DISTRICT", ""), Some("FDT"));
        assert_eq!(suffix_of("REGIONAL S.W.A.T TEAM", ""), Some("SWAT"));
        assert_eq!(suffix_of("METRO TRANSIT AUTHORITY", ""), Some("TA"));
        assert_eq!(suffix_of("OHIO DEPARTMENT OF TRANSPORTATION", ""), Some("DOT"));
        assert_eq!(suffix_of("PORT AUTHORITY OF NY", ""), Some("PA"));
        assert_eq!(suffix_of("CITY PARKS AND RECREATION", ""), Some("PAR"));
        assert_eq!(suffix_of("ACME WIDGETS", "business"), None);
    }

    #[test]
    fn test_non_emergency_excluded() {
        // NON EMERGENCY blocks FEMS and EMS, falls through to FD
        assert_eq!(suffix_of("FIRE DEPARTMENT", "NON EMERGENCY"), Some("FD"));
        assert_eq!(suffix_of("PUBLIC WORKS", "NON EMERGENCY"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(suffix_of("city police", ""), Some("PD"));
        assert_eq!(suffix_of("Acme", "state police"), Some("SPD"));
    }

    #[test]
    fn test_acronym_suffix() {
        let none = HashSet::new();
        assert_eq!(acronym_suffix("Acme Widget Corp Inc", 3, "Q", &none), "AWC");
        assert_eq!(acronym_suffix("smith-jones, llc", 3, "Q", &none), "SJL");
        assert_eq!(acronym_suffix("", 3, "Q", &none), "Q");
        assert_eq!(acronym_suffix("--- ...", 3, "Q", &none), "Q");

        let excluded: HashSet<String> = ["THE".to_string(), "OF".to_string()].into_iter().collect();
        assert_eq!(acronym_suffix("The Bank of Ozarks", 3, "Q", &excluded), "BO");
    }
}
