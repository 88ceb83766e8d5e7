pub mod dataset;
pub mod viewer_config;

pub use dataset::*;
pub use viewer_config::*;
