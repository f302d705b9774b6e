//! Configuration for the query utility: the on-disk format, secret resolution
//! and the runtime `DatabaseConfig` consumed by the execution layer.

pub mod configuration;
pub mod environment;
pub mod error;
pub mod values;
pub mod version1;

pub use configuration::{generate_latest_schema, make_runtime_configuration, DatabaseConfig};
pub use error::{
    InvalidConfigError, MakeRuntimeConfigurationError, ParseConfigurationError,
    WriteParsedConfigurationError,
};
pub use values::{PoolSettings, Secret};
pub use version1::{
    parse_configuration, write_parsed_configuration, ParsedConfiguration, CONFIGURATION_FILENAME,
};
