use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Where and how to open one physical connection.
#[derive(Debug, Default, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub dsn: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "secret")]
    pub password: Option<SecretString>,
    /// Driver specific settings, passed to the connector untouched.
    #[serde(default)]
    pub options: IndexMap<String, String>,
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let maybe_password = Option::<String>::deserialize(deserializer)?;
    Ok(maybe_password.map(SecretString::from))
}

impl Target {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn expose_password(&self) -> Option<&str> {
        self.password.as_ref().map(|password| password.expose_secret())
    }

    pub fn validate(&self) -> Result<()> {
        if self.dsn.trim().is_empty() {
            return Err(Error::invalid_argument(
                "dsn is required for a database connection",
            ));
        }
        Ok(())
    }
}

/// Primary (read/write) target plus an optional read only secondary.
///
/// Deserializes from the primary's fields with the secondary nested under
/// `secondary` (or `slave`):
///
/// ```json
/// { "dsn": "mysql:host=db1", "secondary": { "dsn": "mysql:host=db2" } }
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub primary: Target,
    #[serde(default, alias = "slave")]
    pub secondary: Option<Target>,
}

impl Config {
    pub fn new(primary: Target) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Target) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Secondary options become the primary options overlaid with its own.
    pub(crate) fn normalized(mut self) -> Self {
        if let Some(secondary) = &mut self.secondary {
            let own = std::mem::take(&mut secondary.options);
            let mut options: IndexMap<String, String> = self
                .primary
                .options
                .iter()
                .filter(|(key, _)| !own.contains_key(*key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            options.extend(own);
            secondary.options = options;
        }
        self
    }
}
