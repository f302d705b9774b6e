//! Runtime configuration for the query utility.

use schemars::{gen::SchemaSettings, schema::RootSchema};

use crate::environment::Environment;
use crate::error::{InvalidConfigError, MakeRuntimeConfigurationError};
use crate::values::{PoolSettings, Secret};
use crate::version1::ParsedConfiguration;

/// The database settings the query utility runs with.
///
/// Values of this type are produced from a `ParsedConfiguration` using
/// `make_runtime_configuration`, which resolves secrets and validates every item.
/// They are read-only for the lifetime of the executor that owns them.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub schema: String,
    pub pool_settings: PoolSettings,
}

impl DatabaseConfig {
    /// Check that every item can be used to connect to a database.
    pub fn check(&self) -> Result<(), InvalidConfigError> {
        if self.host.trim().is_empty() {
            return Err(InvalidConfigError::new(
                "host",
                &self.host,
                "the host must not be empty",
            ));
        }
        if self.port == 0 {
            return Err(InvalidConfigError::new(
                "port",
                self.port,
                "the port must be between 1 and 65535",
            ));
        }
        if self.database.trim().is_empty() {
            return Err(InvalidConfigError::new(
                "database",
                &self.database,
                "the database name must not be empty",
            ));
        }
        if self.pool_settings.max_connections == 0 {
            return Err(InvalidConfigError::new(
                "poolSettings.maxConnections",
                self.pool_settings.max_connections,
                "the pool needs at least one connection",
            ));
        }
        Ok(())
    }
}

// The password never ends up in logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("pool_settings", &self.pool_settings)
            .finish()
    }
}

/// Resolve the secrets in a parsed configuration and validate the result.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<DatabaseConfig, MakeRuntimeConfigurationError> {
    let password = match parsed_config.password {
        Secret::Plain(password) => password,
        Secret::FromEnvironment { variable } => environment.read(&variable).map_err(|error| {
            MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                attribute: "password",
                message: error.to_string(),
            }
        })?,
    };

    let port = u16::try_from(parsed_config.port).map_err(|_| {
        InvalidConfigError::new(
            "port",
            parsed_config.port,
            "the port must be between 1 and 65535",
        )
    })?;

    let config = DatabaseConfig {
        host: parsed_config.host,
        port,
        username: parsed_config.username,
        password,
        database: parsed_config.database,
        schema: parsed_config.schema,
        pool_settings: parsed_config.pool_settings,
    };
    config.check()?;
    Ok(config)
}

/// The JSON schema of the newest configuration format.
pub fn generate_latest_schema() -> RootSchema {
    SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<ParsedConfiguration>()
}
