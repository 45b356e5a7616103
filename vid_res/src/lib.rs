pub mod filler;
pub mod probe_api;
pub mod resolution;

pub use filler::{
    generate_filler, generate_filler_with, FillerSpec, DEFAULT_FILLER_DURATION_SECS,
    DEFAULT_FILLER_FILE_NAME,
};
pub use probe_api::{
    analyze_directory, probe_directory, probe_file, ProbeFailure, ProbeReport, ResolutionAnalysis,
};
pub use resolution::{
    fit_dimensions, solve, DimensionMaxima, LadderEntry, ResolutionSample, TargetResolution,
    STANDARD_LADDER,
};
