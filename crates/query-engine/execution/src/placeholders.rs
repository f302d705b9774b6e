//! The placeholders a query template may use to refer to the database settings.

use std::borrow::Cow;

use enum_iterator::Sequence;
use query_util_configuration::DatabaseConfig;

pub const START_MARKER: &str = "<<";
pub const END_MARKER: &str = ">>";

/// Names resolved from the configuration, e.g. `<<schema>>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum AdministrativeName {
    Schema,
    Database,
    User,
    Host,
    Port,
}

impl AdministrativeName {
    /// Every spelling that refers to this name in a template.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            AdministrativeName::Schema => &["schema"],
            AdministrativeName::Database => &["database"],
            AdministrativeName::User => &["user", "username"],
            AdministrativeName::Host => &["host", "hostname"],
            AdministrativeName::Port => &["port"],
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        enum_iterator::all::<AdministrativeName>().find(|admin| admin.aliases().contains(&name))
    }

    pub fn value(self, config: &DatabaseConfig) -> Cow<'_, str> {
        match self {
            AdministrativeName::Schema => Cow::Borrowed(&config.schema),
            AdministrativeName::Database => Cow::Borrowed(&config.database),
            AdministrativeName::User => Cow::Borrowed(&config.username),
            AdministrativeName::Host => Cow::Borrowed(&config.host),
            AdministrativeName::Port => Cow::Owned(config.port.to_string()),
        }
    }
}

/// Replace the administrative placeholders in `template`. Any other `<<name>>`
/// is left as it is.
pub fn resolve(template: &str, config: &DatabaseConfig) -> String {
    query_engine_template::resolve(START_MARKER, END_MARKER, template, |name| {
        AdministrativeName::parse(name).map(|admin| admin.value(config))
    })
}
