//! Entry parameters with `${...}` substitution.
//!
//! Recognised expressions:
//! - `${env.NAME}`: the environment variable `NAME`.
//! - `${connectors.string['key']}`: the first value any nested connector
//!   holds for `key`.
//! - `${connector.NAME.string['key']}`: the value the nested connector
//!   called `NAME` holds for `key`.
//!
//! Keys may be quoted with `'` or `"`. Any other `${...}` is left as is.
//! An expression that matches one of the forms above but has no value is an
//! error, so the entry is omitted rather than built with a half-filled
//! parameter.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use settings_core::Connector;

use crate::error::ConfigError;

const OPEN: &str = "${";

/// Replaces every `${env.NAME}` in `raw` with the value of `NAME`.
///
/// Other `${...}` sequences are left untouched. An unset variable is an error.
pub fn substitute(raw: &str) -> Result<String, ConfigError> {
    expand(raw, &[])
}

fn expand(raw: &str, connectors: &[Arc<dyn Connector>]) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        match evaluate(&after[..end], connectors)? {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// `Ok(None)` means the expression is not one we know.
fn evaluate(expression: &str, connectors: &[Arc<dyn Connector>]) -> Result<Option<String>, ConfigError> {
    if let Some(name) = expression.strip_prefix("env.") {
        return std::env::var(name)
            .map(Some)
            .map_err(|_| ConfigError::MissingEnvVar(name.to_string()));
    }

    let value = if let Some(access) = expression.strip_prefix("connectors.") {
        let Some(key) = string_key(access) else {
            return Ok(None);
        };
        connectors.iter().find_map(|connector| connector.get_string(key))
    } else if let Some(rest) = expression.strip_prefix("connector.") {
        let Some((name, access)) = rest.split_once(".string[") else {
            return Ok(None);
        };
        let Some(key) = access.strip_suffix(']').and_then(quoted) else {
            return Ok(None);
        };
        connectors
            .iter()
            .find(|connector| connector.name() == name)
            .and_then(|connector| connector.get_string(key))
    } else {
        return Ok(None);
    };

    value
        .map(Some)
        .ok_or_else(|| ConfigError::UnresolvedExpression(expression.to_string()))
}

/// `string['key']` to `key`.
fn string_key(access: &str) -> Option<&str> {
    quoted(access.strip_prefix("string[")?.strip_suffix(']')?)
}

fn quoted(text: &str) -> Option<&str> {
    ['\'', '"']
        .into_iter()
        .find_map(|quote| text.strip_prefix(quote)?.strip_suffix(quote))
}

/// Parameters of one named entry, plus the nested connectors their
/// expressions may read from.
#[derive(Clone, Default)]
pub struct Params {
    owner: String,
    values: BTreeMap<String, String>,
    connectors: Vec<Arc<dyn Connector>>,
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connectors: Vec<_> = self.connectors.iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("Params")
            .field("owner", &self.owner)
            .field("values", &self.values)
            .field("connectors", &connectors)
            .finish()
    }
}

impl Params {
    pub fn new(owner: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            owner: owner.into(),
            values,
            connectors: Vec::new(),
        }
    }

    /// Makes `connectors` available to `${connectors...}` and
    /// `${connector.NAME...}` expressions.
    pub fn with_connectors(mut self, connectors: Vec<Arc<dyn Connector>>) -> Self {
        self.connectors = connectors;
        self
    }

    /// Name of the entry these parameters belong to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.values
            .get(key)
            .map(|raw| expand(raw, &self.connectors))
            .transpose()
    }

    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)?.ok_or_else(|| ConfigError::MissingParameter {
            name: self.owner.clone(),
            param: key.to_string(),
        })
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidParameter {
                name: self.owner.clone(),
                param: key.to_string(),
                message: format!("expected true or false, got '{value}'"),
            }),
        }
    }
}
