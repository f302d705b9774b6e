//! Access to environment variables, abstracted so tests can supply a fixed set.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The name of an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema)]
pub struct Variable(String);

impl Variable {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Variable(name) = self;
        write!(f, "{name}")
    }
}

/// Something that can answer for the value of an environment variable.
pub trait Environment {
    fn read(&self, variable: &Variable) -> Result<String, Error>;
}

impl<E: Environment> Environment for &E {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        (*self).read(variable)
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        std::env::var(variable.as_str()).map_err(|err| match err {
            std::env::VarError::NotPresent => Error::VariableNotPresent(variable.clone()),
            std::env::VarError::NotUnicode(_) => Error::NonUnicodeValue(variable.clone()),
        })
    }
}

/// A fixed set of variables. Used in tests.
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment(BTreeMap<Variable, String>);

impl<const N: usize> From<[(Variable, String); N]> for FixedEnvironment {
    fn from(value: [(Variable, String); N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl Environment for FixedEnvironment {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        self.0
            .get(variable)
            .cloned()
            .ok_or_else(|| Error::VariableNotPresent(variable.clone()))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("the environment variable {0} is not set")]
    VariableNotPresent(Variable),
    #[error("the environment variable {0} does not contain valid unicode")]
    NonUnicodeValue(Variable),
}
