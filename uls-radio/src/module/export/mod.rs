///! Radio programming export

mod profile;
pub use profile::{
    FREQUENCY_COLUMN, GENERIC, LOCATION_COLUMN, NAME_COLUMN, RadioProfile, SUPPORTED_RADIOS,
};

mod builder;
pub use builder::{CSV_FILE_PREFIX, ExportPlan, format_frequency};
