pub mod calendar;
pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod series;
pub mod sink;
pub mod table;
pub mod total;
pub mod views;

pub use error::PipelineError;
pub use pipeline::Pipeline;
