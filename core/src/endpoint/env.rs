use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered list of environment bindings.
///
/// Later bindings shadow earlier ones with the same name, both for [`get`]
/// and for the rendered export prefix (the shell evaluates exports in order).
///
/// Serialized as a table whose keys keep declaration order, so a binding
/// may refer to any binding declared above it.
///
/// [`get`]: Environment::get
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(String, String)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `self` followed by `other`, so `other` wins on conflicts.
    pub fn layered(&self, other: &Environment) -> Environment {
        let mut vars = Vec::with_capacity(self.vars.len() + other.vars.len());
        vars.extend(self.vars.iter().cloned());
        vars.extend(other.vars.iter().cloned());
        Environment { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render as `export NAME="VALUE";` statements, ready to prepend to a
    /// shell command. `$` is left alone so bindings can refer to each other.
    pub fn to_export_prefix(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("export {}=\"{}\";", k, escape_double_quoted(v)))
            .collect()
    }
}

fn escape_double_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vars.len()))?;
        for (k, v) in &self.vars {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct EnvironmentVisitor;

impl<'de> Visitor<'de> for EnvironmentVisitor {
    type Value = Environment;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a table of NAME = \"value\" bindings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Environment, A::Error> {
        let mut env = Environment::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            env.set(k, v);
        }
        Ok(env)
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnvironmentVisitor)
    }
}
