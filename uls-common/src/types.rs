use serde::{Deserialize, Serialize};

/// License status filter applied to the HD status column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Expired,
    Any,
}

impl StatusFilter {
    /// Status column value to match, `None` for no predicate at all
    pub fn status_code(&self) -> Option<&'static str> {
        match self {
            StatusFilter::Active => Some("A"),
            StatusFilter::Expired => Some("E"),
            StatusFilter::Any => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Expired => "expired",
            StatusFilter::Any => "any",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "expired" => Ok(StatusFilter::Expired),
            "any" => Ok(StatusFilter::Any),
            _ => Err(format!("Unknown status filter: {}", s)),
        }
    }
}

/// Where the leading part of a channel name comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PrefixPolicy {
    /// City abbreviation, overridable by the suffix classifier
    #[default]
    Auto,
    /// City abbreviation only
    City,
    Callsign,
    /// Custom prefix used verbatim
    Literal(String),
}

impl PrefixPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            PrefixPolicy::Auto => "auto",
            PrefixPolicy::City => "city",
            PrefixPolicy::Callsign => "callsign",
            PrefixPolicy::Literal(s) => s.as_str(),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, PrefixPolicy::Auto)
    }
}

impl std::fmt::Display for PrefixPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PrefixPolicy {
    fn from(s: &str) -> Self {
        match s {
            "auto" => PrefixPolicy::Auto,
            "city" => PrefixPolicy::City,
            "callsign" => PrefixPolicy::Callsign,
            other => PrefixPolicy::Literal(other.to_string()),
        }
    }
}

/// Where the trailing part of a channel name comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SuffixPolicy {
    /// Keyword classification of entity and eligibility text
    #[default]
    Auto,
    /// The record's frequency
    Freq,
    /// Custom suffix used verbatim
    Literal(String),
}

impl SuffixPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            SuffixPolicy::Auto => "auto",
            SuffixPolicy::Freq => "freq",
            SuffixPolicy::Literal(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for SuffixPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SuffixPolicy {
    fn from(s: &str) -> Self {
        match s {
            "auto" => SuffixPolicy::Auto,
            "freq" => SuffixPolicy::Freq,
            other => SuffixPolicy::Literal(other.to_string()),
        }
    }
}

/// Downloadable ULS archives accepted by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceArchive {
    #[serde(rename = "l_paging.zip")]
    Paging,
    #[serde(rename = "l_LMbcast.zip")]
    LmBcast,
    #[serde(rename = "l_mdsitfs.zip")]
    MdsItfs,
    #[serde(rename = "l_market.zip")]
    Market,
    #[serde(rename = "l_coast.zip")]
    Coast,
    #[serde(rename = "l_LMpriv.zip")]
    LmPriv,
    #[serde(rename = "l_LMcomm.zip")]
    LmComm,
    #[serde(rename = "l_micro.zip")]
    Micro,
}

impl SourceArchive {
    pub const ALL: [SourceArchive; 8] = [
        SourceArchive::Paging,
        SourceArchive::LmBcast,
        SourceArchive::MdsItfs,
        SourceArchive::Market,
        SourceArchive::Coast,
        SourceArchive::LmPriv,
        SourceArchive::LmComm,
        SourceArchive::Micro,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            SourceArchive::Paging => "l_paging.zip",
            SourceArchive::LmBcast => "l_LMbcast.zip",
            SourceArchive::MdsItfs => "l_mdsitfs.zip",
            SourceArchive::Market => "l_market.zip",
            SourceArchive::Coast => "l_coast.zip",
            SourceArchive::LmPriv => "l_LMpriv.zip",
            SourceArchive::LmComm => "l_LMcomm.zip",
            SourceArchive::Micro => "l_micro.zip",
        }
    }

    /// Archive file name without the `.zip` extension
    pub fn stem(&self) -> &'static str {
        self.file_name().trim_end_matches(".zip")
    }

    /// Supported archive file names, sorted for display
    pub fn supported_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Self::ALL.iter().map(|a| a.file_name()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Display for SourceArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

impl std::str::FromStr for SourceArchive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|a| a.file_name() == s)
            .copied()
            .ok_or_else(|| format!("Unsupported archive: {}", s))
    }
}

/// US state and territory abbreviations accepted as a search filter
pub const US_STATES: [&str; 56] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA",
    "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD",
    "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC",
    "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
    "DC", "PR", "GU", "VI", "AS", "MP",
];

pub fn is_valid_state(state: &str) -> bool {
    let state = state.trim().to_uppercase();
    US_STATES.contains(&state.as_str())
}

/// One search result row: a frequency joined with its licensee and location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Assigned frequency in MHz, as stored (e.g. "154.44500000")
    pub frequency: String,
    pub call_sign: String,
    /// Licensee name, trimmed and upper-cased
    pub entity_name: String,
    /// Eligibility text from the license class row (may be empty)
    pub eligibility: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// County from the location row (may be empty)
    pub county: String,
    /// Radio service code (e.g. "PW")
    pub service_code: String,
    /// License status code ("A", "E", ...)
    pub status: String,
}

impl std::fmt::Display for LicenseRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Freq: {} MHz, Call Sign: {}, Entity: {}, City/State/ZIP/County: {}/{}/{}/{}, Service: {}, Eligibility: {}, Status: {}",
            self.frequency,
            self.call_sign,
            self.entity_name,
            self.city,
            self.state,
            self.zip_code,
            self.county,
            self.service_code,
            self.eligibility,
            self.status
        )
    }
}
