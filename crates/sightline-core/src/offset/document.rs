//! Typed shapes of the two schema source documents.
//!
//! Globals document:
//!
//! ```json
//! { "client.dll": { "dwEntityList": 30000000, "dwViewMatrix": 30100000 } }
//! ```
//!
//! Classes document:
//!
//! ```json
//! { "client.dll": { "classes": { "C_BaseEntity": { "fields": { "m_iHealth": 836 } } } } }
//! ```
//!
//! Values stay as raw JSON so that one mistyped field is reported by path
//! instead of failing the whole parse.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{SchemaError, SchemaIssue};

/// Module name → flat global offsets
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct GlobalsDocument {
    pub modules: HashMap<String, HashMap<String, Value>>,
}

/// Module name → class layouts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ClassesDocument {
    pub modules: HashMap<String, ModuleClasses>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleClasses {
    #[serde(default)]
    pub classes: HashMap<String, ClassLayout>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassLayout {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl GlobalsDocument {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|source| SchemaError::Parse {
            document: "globals document",
            source,
        })
    }

    /// Look up `module.key`, recording an issue instead of failing.
    pub(crate) fn lookup(&self, module: &str, key: &str, issues: &mut Vec<SchemaIssue>) -> u64 {
        let path = format!("{}.{}", module, key);
        let value = self.modules.get(module).and_then(|globals| globals.get(key));
        resolve_value(value, path, issues)
    }
}

impl ClassesDocument {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|source| SchemaError::Parse {
            document: "classes document",
            source,
        })
    }

    /// Look up `module.classes.class.fields.field`, recording an issue instead of failing.
    pub(crate) fn lookup(
        &self,
        module: &str,
        class: &str,
        field: &str,
        issues: &mut Vec<SchemaIssue>,
    ) -> u64 {
        let path = format!("{}.classes.{}.fields.{}", module, class, field);
        let value = self
            .modules
            .get(module)
            .and_then(|m| m.classes.get(class))
            .and_then(|c| c.fields.get(field));
        resolve_value(value, path, issues)
    }
}

fn resolve_value(value: Option<&Value>, path: String, issues: &mut Vec<SchemaIssue>) -> u64 {
    match value {
        None | Some(Value::Null) => {
            issues.push(SchemaIssue::Missing(path));
            0
        }
        Some(value) => match as_offset(value) {
            Some(offset) => offset,
            None => {
                issues.push(SchemaIssue::NotANumber(path));
                0
            }
        },
    }
}

/// Accept non-negative integers, including integral floats such as `836.0`.
fn as_offset(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}
