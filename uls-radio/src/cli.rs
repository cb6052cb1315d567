///! Command line - flags, listing commands and up-front validation
///!
///! Everything here runs before any download or storage access, so bad
///! criteria are rejected without touching the cache.

use clap::Parser;
use std::path::PathBuf;
use uls_common::{PrefixPolicy, SourceArchive, StatusFilter, SuffixPolicy, is_valid_state};

use crate::config::AppConfig;
use crate::error::{Result, UlsError};
use crate::module::channel::NamingConfig;
use crate::module::export::RadioProfile;
use crate::module::uls::LicenseSearch;

#[derive(Parser, Debug, Clone)]
#[command(name = "uls-radio", version, about = "Search FCC ULS licenses and export radio channel lists")]
pub struct Cli {
    /// Output format for the target radio model
    #[arg(short = 'r', long, default_value = "generic")]
    pub radio: String,

    /// List supported radio models and exit
    #[arg(long)]
    pub list_radios: bool,

    /// Starting number of the channel (Location) column
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub channel_offset: i64,

    /// Channel name prefix: auto, city, callsign or a custom string
    #[arg(long, default_value = "auto")]
    pub channel_prefix: String,

    /// Channel name suffix: auto, freq or a custom string
    #[arg(long, default_value = "auto")]
    pub channel_suffix: String,

    /// Override the radio's maximum channel name length
    #[arg(long, allow_negative_numbers = true)]
    pub channel_max: Option<i64>,

    /// ZIP code(s) to search, comma-separated
    #[arg(short = 'z', long)]
    pub zip: Option<String>,

    /// City to search
    #[arg(short = 'c', long)]
    pub city: Option<String>,

    /// State abbreviation to search (e.g. NY, CA)
    #[arg(long)]
    pub state: Option<String>,

    /// Radio service code(s) to search, comma-separated (e.g. PW,AF)
    #[arg(short = 's', long)]
    pub service: Option<String>,

    /// List service codes present in the cache and exit
    #[arg(long)]
    pub list_services: bool,

    /// License status filter: active, expired or any
    #[arg(long, default_value = "active")]
    pub status: StatusFilter,

    /// List supported archives and exit
    #[arg(long)]
    pub list_zipfiles: bool,

    /// Additional archives to load, comma-separated
    #[arg(long)]
    pub zipfiles: Option<String>,

    /// Re-create the cache and re-download every archive
    #[arg(long)]
    pub clear_cache: bool,

    /// Increase output verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file
    #[arg(long, default_value = "uls-radio.toml")]
    pub config: PathBuf,
}

/// Validated inputs for one search and export run
#[derive(Debug)]
pub struct RunPlan {
    pub profile: &'static RadioProfile,
    pub search: LicenseSearch,
    pub naming: NamingConfig,
    pub archives: Vec<SourceArchive>,
    pub channel_offset: i64,
    pub clear_cache: bool,
}

impl RunPlan {
    /// Heading printed above the result list
    pub fn label(&self) -> String {
        let criteria = if !self.search.zip_codes.is_empty() {
            format!("ZIP(s) {}", self.search.zip_codes.join(", "))
        } else if let Some(city) = &self.search.city {
            format!("City {}", city)
        } else {
            format!("State {}", self.search.state.as_deref().unwrap_or_default())
        };

        format!(
            "Results for {} and Service Codes {} (Status: {}):",
            criteria,
            self.search.service_codes.join(", "),
            self.search.status
        )
    }
}

/// Split a comma list, trimming entries and dropping empty ones.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl Cli {
    /// Default archives from the config followed by `--zipfiles`, in order,
    /// without duplicates. Every name must be in the allow-list.
    pub fn archives(&self, config: &AppConfig) -> Result<Vec<SourceArchive>> {
        let mut names: Vec<String> = Vec::new();
        for name in config
            .default_archives
            .iter()
            .cloned()
            .chain(split_list(self.zipfiles.as_deref()))
        {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let invalid: Vec<&str> = names
            .iter()
            .filter(|n| n.parse::<SourceArchive>().is_err())
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            return Err(UlsError::InputValidation(format!(
                "unsupported archive(s): {}. Supported archives: {}",
                invalid.join(", "),
                SourceArchive::supported_names().join(", ")
            )));
        }

        Ok(names.iter().filter_map(|n| n.parse().ok()).collect())
    }

    /// Check the search criteria and resolve profile, naming and archives.
    pub fn validate(&self, config: &AppConfig) -> Result<RunPlan> {
        let profile = RadioProfile::lookup(&self.radio)?;

        let zip_codes = split_list(self.zip.as_deref());
        let city = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let state = self.state.as_deref().map(str::trim).filter(|s| !s.is_empty());

        if zip_codes.is_empty() && city.is_none() && state.is_none() {
            return Err(UlsError::InputValidation(
                "you must specify at least one of --zip, --city or --state".to_string(),
            ));
        }

        if let Some(state) = state {
            if !is_valid_state(state) {
                return Err(UlsError::InputValidation(format!(
                    "'{}' is not a valid US state abbreviation",
                    state
                )));
            }
        }

        let service_codes: Vec<String> = split_list(self.service.as_deref())
            .into_iter()
            .map(|s| s.to_uppercase())
            .collect();
        if service_codes.is_empty() {
            return Err(UlsError::InputValidation(
                "you must specify at least one service code with --service (e.g. PW,IG). \
                 Use --list-services to list available service codes"
                    .to_string(),
            ));
        }

        let archives = self.archives(config)?;

        let max_length = match self.channel_max {
            Some(max) if max <= 0 => {
                return Err(UlsError::Configuration("--channel-max must be a positive integer".to_string()));
            }
            Some(max) => max as usize,
            None => profile.chan_name_max_len,
        };

        let mut naming = NamingConfig::new(
            PrefixPolicy::from(self.channel_prefix.as_str()),
            SuffixPolicy::from(self.channel_suffix.as_str()),
            max_length,
        )?;
        naming.suffix_cutoff = config.naming.suffix_cutoff;
        naming.suffix_fallback = config.naming.suffix_fallback.clone();
        naming.excluded_words = config.naming.excluded_words.iter().map(|w| w.trim().to_uppercase()).collect();

        Ok(RunPlan {
            profile,
            search: LicenseSearch {
                service_codes,
                zip_codes,
                city: city.map(str::to_string),
                state: state.map(str::to_uppercase),
                status: self.status,
            },
            naming,
            archives,
            channel_offset: self.channel_offset,
            clear_cache: self.clear_cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("uls-radio").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--zip", "62701", "-s", "pw"]);
        assert_eq!(cli.radio, "generic");
        assert_eq!(cli.channel_offset, 1);
        assert_eq!(cli.status, StatusFilter::Active);

        let plan = cli.validate(&AppConfig::default()).unwrap();
        assert_eq!(plan.profile.name, "generic");
        assert_eq!(plan.naming.max_length, 7);
        assert_eq!(plan.search.service_codes, vec!["PW"]);
        assert_eq!(plan.archives, vec![SourceArchive::LmPriv]);
        assert_eq!(plan.label(), "Results for ZIP(s) 62701 and Service Codes PW (Status: active):");
    }

    #[test]
    fn test_location_required() {
        let err = parse(&["-s", "PW"]).validate(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, UlsError::InputValidation(_)));
    }

    #[test]
    fn test_state_must_be_known() {
        let err = parse(&["--state", "ZZ", "-s", "PW"]).validate(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, UlsError::InputValidation(_)));

        let plan = parse(&["--state", "ny", "-s", "PW"]).validate(&AppConfig::default()).unwrap();
        assert_eq!(plan.search.state.as_deref(), Some("NY"));
        assert!(plan.label().starts_with("Results for State NY"));
    }

    #[test]
    fn test_service_required() {
        let err = parse(&["-c", "Springfield", "-s", " , "]).validate(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, UlsError::InputValidation(_)));
    }

    #[test]
    fn test_channel_max() {
        let err = parse(&["-c", "Albany", "-s", "PW", "--channel-max", "0"])
            .validate(&AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, UlsError::Configuration(_)));

        let plan = parse(&["-c", "Albany", "-s", "PW", "--channel-max", "12", "--channel-prefix", "callsign"])
            .validate(&AppConfig::default())
            .unwrap();
        assert_eq!(plan.naming.max_length, 12);
        assert_eq!(plan.naming.prefix, PrefixPolicy::Callsign);
    }

    #[test]
    fn test_unknown_radio() {
        let err = parse(&["-c", "Albany", "-s", "PW", "-r", "baofeng"])
            .validate(&AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, UlsError::Configuration(_)));
    }

    #[test]
    fn test_archives_extend_defaults() {
        let cli = parse(&["-c", "Albany", "-s", "PW", "--zipfiles", "l_coast.zip, l_LMpriv.zip,l_micro.zip"]);
        assert_eq!(
            cli.archives(&AppConfig::default()).unwrap(),
            vec![SourceArchive::LmPriv, SourceArchive::Coast, SourceArchive::Micro]
        );

        let cli = parse(&["-c", "Albany", "-s", "PW", "--zipfiles", "l_bogus.zip"]);
        assert!(matches!(cli.archives(&AppConfig::default()), Err(UlsError::InputValidation(_))));
    }

    #[test]
    fn test_naming_section_applies() {
        let mut config = AppConfig::default();
        config.naming.suffix_fallback = "X".to_string();
        config.naming.excluded_words = vec!["of".to_string()];

        let plan = parse(&["-c", "Albany", "-s", "PW"]).validate(&config).unwrap();
        assert_eq!(plan.naming.suffix_fallback, "X");
        assert!(plan.naming.excluded_words.contains("OF"));
    }
}
