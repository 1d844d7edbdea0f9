//! Core data types and I/O operations.

pub mod loaders;
pub mod scan;
pub mod writers;

pub use loaders::{LoaderError, ProfileTable};
pub use scan::{LineScan, Sample, ScanError, StationKey};
pub use writers::{write_profile_crossings_csv, write_series_csv, ProfileCrossingRow, WriteError};
