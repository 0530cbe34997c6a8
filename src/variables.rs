//! The variable store: resolved answers plus derived values.

use crate::error::Result;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A boolean encoded the way templates compare it: `"y"` or `"n"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawYesNo", into = "String")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYesNo {
    Bool(bool),
    Text(String),
}

impl TryFrom<RawYesNo> for YesNo {
    type Error = String;

    fn try_from(raw: RawYesNo) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawYesNo::Bool(b) => Ok(b.into()),
            RawYesNo::Text(s) => {
                YesNo::parse(&s).ok_or_else(|| format!("'{}' is not a yes/no value", s))
            }
        }
    }
}

impl From<YesNo> for String {
    fn from(value: YesNo) -> Self {
        value.as_str().to_string()
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl YesNo {
    /// Accepts `y/yes/true/1` and `n/no/false/0`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Some(YesNo::Yes),
            "n" | "no" | "false" | "0" => Some(YesNo::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "y",
            YesNo::No => "n",
        }
    }

    pub fn is_yes(&self) -> bool {
        *self == YesNo::Yes
    }
}

/// A user-supplied configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// One of a variable's declared choices. Membership is checked by the validator.
    Choice(String),
    Flag(YesNo),
}

impl Value {
    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(s) | Value::Choice(s) => s,
            Value::Flag(flag) => flag.as_str(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration for one generation run.
///
/// Only user values are stored. Derived values are kept as expressions and
/// recomputed on every [`Configuration::context`] call, so they can never
/// go stale after [`Configuration::set`].
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    values: IndexMap<String, Value>,
    derived: IndexMap<String, String>,
}

impl Configuration {
    pub fn new(derived: IndexMap<String, String>) -> Self {
        Self { values: IndexMap::new(), derived }
    }

    pub fn set<K: Into<String>>(&mut self, key: K, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn derived(&self) -> &IndexMap<String, String> {
        &self.derived
    }

    /// User values only, as a JSON object.
    pub fn user_context(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.as_str().to_string())))
            .collect();
        serde_json::Value::Object(map)
    }

    /// User values plus every derived value, evaluated in declaration order.
    /// Each derived expression sees the user values and the derived values
    /// declared before it.
    pub fn context(&self, renderer: &dyn TemplateRenderer) -> Result<serde_json::Value> {
        let mut context = self.user_context();
        for (name, expression) in &self.derived {
            let value = renderer.evaluate(expression, &context)?;
            if let serde_json::Value::Object(map) = &mut context {
                map.insert(name.clone(), value);
            }
        }
        Ok(context)
    }

    /// Looks up a user or derived value.
    pub fn get(
        &self,
        key: &str,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Option<serde_json::Value>> {
        if let Some(value) = self.values.get(key) {
            return Ok(Some(serde_json::Value::String(value.as_str().to_string())));
        }
        if !self.derived.contains_key(key) {
            return Ok(None);
        }
        Ok(self.context(renderer)?.get(key).cloned())
    }
}
