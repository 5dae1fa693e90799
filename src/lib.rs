pub mod classifier;
pub mod cli;
pub mod codebook;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod dictionary;
pub mod error;
pub mod extractor;
pub mod kmeans;
pub mod matrix;
pub mod pipeline;
pub mod svm;
pub mod utils;

pub use codebook::{Codebook, Histogram};
pub use config::Opts;
pub use dataset::{Dataset, LabelMap, Sample, Split};
pub use error::{Error, Result};
pub use extractor::{DescriptorExtractor, Descriptors};
pub use pipeline::{Pipeline, Report, Stage};
