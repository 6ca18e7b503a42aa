//! Configuration module
//!
//! Kagami is configured through a TOML file naming the seed URL, the optional
//! discovery filter, worker pool sizes, the user agent identification, and
//! the output locations (mirror directory and state database).

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlConfig, FilterConfig, OutputConfig, UserAgentConfig};
pub use validation::validate;
