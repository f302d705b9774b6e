//! Tests for reading, validating and resolving configuration.

use similar_asserts::assert_eq;

use query_util_configuration::environment::FixedEnvironment;
use query_util_configuration::{
    generate_latest_schema, make_runtime_configuration, parse_configuration,
    write_parsed_configuration, InvalidConfigError, MakeRuntimeConfigurationError,
    ParseConfigurationError, ParsedConfiguration, PoolSettings, Secret, CONFIGURATION_FILENAME,
};

fn password_environment() -> FixedEnvironment {
    FixedEnvironment::from([(
        "QUERY_UTIL_DATABASE_PASSWORD".into(),
        "hunter2".to_string(),
    )])
}

#[tokio::test]
async fn parses_a_configuration_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join(CONFIGURATION_FILENAME),
        r#"{
            "version": 1,
            "host": "db.internal",
            "port": 5432,
            "username": "svc",
            "password": { "plain": "secret" },
            "database": "orders"
        }"#,
    )?;

    let parsed = parse_configuration(dir.path()).await?;

    assert_eq!(parsed.host, "db.internal");
    assert_eq!(parsed.schema, "public");
    assert_eq!(parsed.password, Secret::Plain("secret".to_string()));
    assert_eq!(parsed.pool_settings, PoolSettings::default());
    Ok(())
}

#[tokio::test]
async fn rejects_an_unknown_version() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parsed = ParsedConfiguration::initial();
    parsed.version = 7;
    std::fs::write(
        dir.path().join(CONFIGURATION_FILENAME),
        serde_json::to_string(&parsed)?,
    )?;

    let result = parse_configuration(dir.path()).await;

    assert!(matches!(
        result,
        Err(ParseConfigurationError::UnsupportedVersion {
            expected: 1,
            found: 7,
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn reports_the_position_of_malformed_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join(CONFIGURATION_FILENAME), "{\n  \"version\": ,\n}")?;

    match parse_configuration(dir.path()).await {
        Err(ParseConfigurationError::ParseError { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn written_configuration_parses_back() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parsed = ParsedConfiguration::initial();
    parsed.pool_settings.max_connections = 4;

    write_parsed_configuration(&parsed, dir.path()).await?;

    assert!(dir.path().join("schema.json").exists());
    assert_eq!(parse_configuration(dir.path()).await?, parsed);
    Ok(())
}

#[test]
fn resolves_the_password_from_the_environment() -> anyhow::Result<()> {
    let config = make_runtime_configuration(ParsedConfiguration::initial(), password_environment())?;

    assert_eq!(config.password, "hunter2");
    assert_eq!(config.port, 5432);
    assert!(!format!("{config:?}").contains("hunter2"));
    Ok(())
}

#[test]
fn missing_password_variable_is_reported() {
    let result = make_runtime_configuration(
        ParsedConfiguration::initial(),
        FixedEnvironment::default(),
    );

    assert!(matches!(
        result,
        Err(MakeRuntimeConfigurationError::MissingEnvironmentVariable {
            attribute: "password",
            ..
        })
    ));
}

#[test]
fn out_of_range_ports_are_invalid() {
    for port in [0, 65_536] {
        let mut parsed = ParsedConfiguration::initial();
        parsed.port = port;

        match make_runtime_configuration(parsed, password_environment()) {
            Err(MakeRuntimeConfigurationError::InvalidConfig(InvalidConfigError {
                key,
                value,
                ..
            })) => {
                assert_eq!(key, "port");
                assert_eq!(value, port.to_string());
            }
            other => panic!("expected an invalid port, got {other:?}"),
        }
    }
}

#[test]
fn empty_host_is_invalid() {
    let mut parsed = ParsedConfiguration::initial();
    parsed.host = "  ".to_string();

    let error = make_runtime_configuration(parsed, password_environment()).unwrap_err();

    assert_eq!(
        error.to_string(),
        "invalid configuration item \"host\" with value \"  \": the host must not be empty"
    );
}

#[test]
fn initial_configuration_conforms_to_the_schema() -> anyhow::Result<()> {
    let schema = serde_json::to_value(generate_latest_schema())?;
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|error| anyhow::anyhow!("invalid schema: {error}"))?;

    let instance = serde_json::to_value(ParsedConfiguration::initial())?;

    assert!(compiled.is_valid(&instance));
    Ok(())
}
