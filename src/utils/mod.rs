pub mod compression;
pub mod config;
pub mod constants;
pub mod logger;
pub mod stats;

pub use self::compression::open_trace;
pub use self::config::PipelineConfig;
pub use self::logger::{LogLevel, Logger};
