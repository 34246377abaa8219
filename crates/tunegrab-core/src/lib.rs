pub mod config;
pub mod logging;

pub mod analysis;
pub mod extractor;
pub mod naming;
pub mod normalize;
pub mod pipeline;
pub mod result;
pub mod sweep;
