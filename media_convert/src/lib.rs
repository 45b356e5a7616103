pub mod conversion_api;
pub mod pipeline;

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod test_support;

pub use conversion_api::{CollisionPolicy, ConversionConfig, TranscodeAdapter};
pub use pipeline::{run, Pipeline, PipelineConfig, RunObserver, RunReport};
