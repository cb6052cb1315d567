///! Export plan - buffered radio profile rows
///!
///! A later collision can rename an entry that was already produced, so rows
///! are collected first, pending renames applied second, and only then
///! written out.

use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uls_common::LicenseRecord;

use super::profile::{FREQUENCY_COLUMN, LOCATION_COLUMN, NAME_COLUMN, RadioProfile};
use crate::error::Result;
use crate::module::channel::{ChannelNameSynthesizer, RetroRename};

pub const CSV_FILE_PREFIX: &str = "radio_frequencies_";

/// Frequency with five decimals; non-numeric values pass through.
pub fn format_frequency(freq: &str) -> String {
    match freq.trim().parse::<f64>() {
        Ok(value) => format!("{:.5}", value),
        Err(_) => {
            warn!("Frequency {:?} is not numeric, writing it unchanged", freq);
            freq.to_string()
        }
    }
}

/// Rows for one radio profile, ready to write
#[derive(Debug)]
pub struct ExportPlan {
    profile: &'static RadioProfile,
    rows: Vec<Vec<String>>,
}

impl ExportPlan {
    /// Build rows for `records`, numbering slots from `chan_offset`.
    pub fn build(
        profile: &'static RadioProfile,
        records: &[LicenseRecord],
        synthesizer: &mut ChannelNameSynthesizer,
        chan_offset: i64,
    ) -> Self {
        let mut rows = Vec::with_capacity(records.len());
        let mut renames: Vec<RetroRename> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let assignment = synthesizer.assign(record, index);

            let mut row = profile.new_row();
            row[LOCATION_COLUMN] = (chan_offset + index as i64).to_string();
            row[NAME_COLUMN] = assignment.name;
            row[FREQUENCY_COLUMN] = format_frequency(&record.frequency);
            rows.push(row);

            renames.extend(assignment.rename);
        }

        let mut plan = Self { profile, rows };
        plan.apply(&renames);
        plan
    }

    /// Overwrite names of already-built rows.
    pub fn apply(&mut self, renames: &[RetroRename]) {
        for rename in renames {
            match self.rows.get_mut(rename.index) {
                Some(row) => row[NAME_COLUMN] = rename.name.clone(),
                None => warn!("Rename target {} out of range", rename.index),
            }
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Write the header and all rows as CSV.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.profile.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write to `radio_frequencies_<radio>_<timestamp>.csv` under `dir`.
    pub fn write_file(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let file_name = format!(
            "{}{}_{}.csv",
            CSV_FILE_PREFIX,
            self.profile.name,
            Local::now().format("%Y%m%d%H%M%S")
        );
        let path = dir.join(file_name);

        let file = std::fs::File::create(&path)?;
        self.write_to(file)?;

        info!("CSV file written: {:?} ({} channels)", path, self.rows.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::channel::NamingConfig;
    use crate::module::export::profile::GENERIC;
    use tempfile::TempDir;
    use uls_common::{PrefixPolicy, SuffixPolicy};

    fn record(freq: &str, entity: &str, city: &str) -> LicenseRecord {
        LicenseRecord {
            frequency: freq.to_string(),
            entity_name: entity.to_string(),
            city: city.to_string(),
            ..Default::default()
        }
    }

    fn synthesizer() -> ChannelNameSynthesizer {
        ChannelNameSynthesizer::new(NamingConfig::new(PrefixPolicy::Auto, SuffixPolicy::Auto, 7).unwrap())
    }

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency("155.475"), "155.47500");
        assert_eq!(format_frequency("460.1000000"), "460.10000");
        assert_eq!(format_frequency("n/a"), "n/a");
    }

    #[test]
    fn test_build_applies_retroactive_rename() {
        let records = vec![
            record("155.475", "CITY OF SPRINGFIELD POLICE", "SPRINGFIELD"),
            record("151.625", "ACME WIDGETS", "SPRINGFIELD"),
            record("460.1", "SPRINGFIELD POLICE DEPARTMENT", "SPRINGFIELD"),
        ];
        let mut synth = synthesizer();

        let plan = ExportPlan::build(&GENERIC, &records, &mut synth, 10);
        let rows = plan.rows();

        assert_eq!(rows[0][LOCATION_COLUMN], "10");
        assert_eq!(rows[0][NAME_COLUMN], "SPPD1");
        assert_eq!(rows[1][NAME_COLUMN], "SPAW");
        assert_eq!(rows[2][NAME_COLUMN], "SPPD2");
        assert_eq!(rows[2][LOCATION_COLUMN], "12");
        assert_eq!(rows[2][FREQUENCY_COLUMN], "460.10000");
        // untouched template fields
        assert_eq!(rows[1][4], "0.00000");
        assert_eq!(rows[1][15], "8.0W");
    }

    #[test]
    fn test_write_to_csv() {
        let records = vec![record("146.52", "ARES", "BOSTON")];
        let plan = ExportPlan::build(&GENERIC, &records, &mut synthesizer(), 1);

        let mut out = Vec::new();
        plan.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Location,Name,Frequency,Duplex"));
        assert_eq!(lines[1], "1,BOA,146.52000,,0.00000,,88.5,88.5,023,NN,023,Tone->Tone,FM,5.0,,8.0W,,,,,");
    }

    #[test]
    fn test_write_file_naming() {
        let dir = TempDir::new().unwrap();
        let plan = ExportPlan::build(&GENERIC, &[], &mut synthesizer(), 1);

        let path = plan.write_file(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("radio_frequencies_generic_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 1);
    }
}
