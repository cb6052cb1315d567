///! Radio profiles - CSV layout and defaults per target radio

use crate::error::{Result, UlsError};

/// Column layout and default values of one radio's import format
#[derive(Debug)]
pub struct RadioProfile {
    pub name: &'static str,
    /// Default channel name length limit
    pub chan_name_max_len: usize,
    pub headers: &'static [&'static str],
    pub default_row: &'static [&'static str],
}

/// Columns overwritten from each record
pub const LOCATION_COLUMN: usize = 0;
pub const NAME_COLUMN: usize = 1;
pub const FREQUENCY_COLUMN: usize = 2;

/// Generic CHIRP-style layout, also accepted by Odmaster
pub static GENERIC: RadioProfile = RadioProfile {
    name: "generic",
    chan_name_max_len: 7,
    headers: &[
        "Location", "Name", "Frequency", "Duplex", "Offset", "Tone", "rToneFreq", "cToneFreq",
        "DtcsCode", "DtcsPolarity", "RxDtcsCode", "CrossMode", "Mode", "TStep", "Skip",
        "Power", "Comment", "URCALL", "RPT1CALL", "RPT2CALL", "DVCODE",
    ],
    default_row: &[
        "", "", "", "", "0.00000", "", "88.5", "88.5", "023", "NN", "023", "Tone->Tone",
        "FM", "5.0", "", "8.0W", "", "", "", "", "",
    ],
};

pub static SUPPORTED_RADIOS: [&RadioProfile; 1] = [&GENERIC];

impl RadioProfile {
    /// Look up a profile by (case-insensitive) name
    pub fn lookup(name: &str) -> Result<&'static RadioProfile> {
        let name = name.trim().to_lowercase();
        SUPPORTED_RADIOS
            .iter()
            .copied()
            .find(|p| p.name == name)
            .ok_or_else(|| {
                UlsError::Configuration(format!(
                    "unsupported radio model: {}. Supported models: {}",
                    name,
                    Self::supported_names().join(", ")
                ))
            })
    }

    pub fn supported_names() -> Vec<&'static str> {
        SUPPORTED_RADIOS.iter().map(|p| p.name).collect()
    }

    /// A fresh row of default values
    pub fn new_row(&self) -> Vec<String> {
        self.default_row.iter().map(|s| s.to_string()).collect()
    }
}
