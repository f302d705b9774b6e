//! The version 1 configuration file format.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::values::{PoolSettings, Secret};

const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";
pub const DEFAULT_PASSWORD_VARIABLE: &str = "QUERY_UTIL_DATABASE_PASSWORD";

/// The configuration as it is written on disk. Turned into a `DatabaseConfig` by
/// `make_runtime_configuration`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    // Which version of the configuration format are we using
    pub version: u32,
    pub host: String,
    // Wider than a port so that out of range values are reported by validation
    // rather than as a parse error.
    pub port: u32,
    pub username: String,
    pub password: Secret,
    pub database: String,
    #[serde(default = "schema_default")]
    pub schema: String,
    #[serde(skip_serializing_if = "PoolSettings::is_default")]
    #[serde(default)]
    pub pool_settings: PoolSettings,
}

fn schema_default() -> String {
    "public".to_string()
}

impl ParsedConfiguration {
    pub fn initial() -> Self {
        ParsedConfiguration::empty()
    }

    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: Secret::FromEnvironment {
                variable: DEFAULT_PASSWORD_VARIABLE.into(),
            },
            database: "postgres".to_string(),
            schema: schema_default(),
            pool_settings: PoolSettings::default(),
        }
    }
}

/// Read `configuration.json` from the given configuration directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents = fs::read_to_string(&configuration_file).await?;

    let parsed: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion {
            file_path: configuration_file,
            expected: CURRENT_VERSION,
            found: parsed.version,
        });
    }

    tracing::debug!(
        file = %configuration_file.display(),
        host = %parsed.host,
        database = %parsed.database,
        "parsed configuration"
    );

    Ok(parsed)
}

/// Write the parsed configuration and its JSON schema into the given directory.
pub async fn write_parsed_configuration(
    parsed_config: &ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let out_dir = out_dir.as_ref();
    if !out_dir.is_dir() {
        return Err(WriteParsedConfigurationError::NotADirectory {
            file_path: out_dir.to_path_buf(),
        });
    }

    let configuration_file = out_dir.join(CONFIGURATION_FILENAME);
    fs::write(
        &configuration_file,
        serde_json::to_string_pretty(parsed_config)? + "\n",
    )
    .await?;

    let schema_file = out_dir.join(CONFIGURATION_JSONSCHEMA_FILENAME);
    let schema = schemars::schema_for!(ParsedConfiguration);
    fs::write(&schema_file, serde_json::to_string_pretty(&schema)? + "\n").await?;

    Ok(())
}
