// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The console variable table.
//!
//! A string-keyed table of runtime-tunable values. Readers pass a default
//! that is returned verbatim when the variable is unset or of a different
//! shape, so call sites stay branch-free.

use std::collections::BTreeMap;

use serde_json::Value;

/// A table of named runtime variables backed by JSON values.
#[derive(Debug, Default)]
pub struct CvarTable {
    vars: BTreeMap<String, Value>,
}

impl CvarTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is set.
    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Sets a boolean variable.
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.vars.insert(name.to_string(), Value::Bool(value));
    }

    /// Sets a float variable.
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_json(name, serde_json::json!(value));
    }

    /// Sets a three-component vector variable.
    pub fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        self.set_json(name, serde_json::json!(value));
    }

    /// Sets a string variable.
    pub fn set_string(&mut self, name: &str, value: &str) {
        self.vars
            .insert(name.to_string(), Value::String(value.to_string()));
    }

    /// Sets a raw JSON value (used when seeding from a config file).
    pub fn set_json(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Reads a boolean, falling back to `default`.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.vars.get(name) {
            Some(Value::Bool(value)) => *value,
            Some(Value::Number(value)) => value.as_f64().unwrap_or(0.0) != 0.0,
            _ => default,
        }
    }

    /// Reads a float, falling back to `default`.
    pub fn get_float(&self, name: &str, default: f32) -> f32 {
        match self.vars.get(name).and_then(Value::as_f64) {
            Some(value) => value as f32,
            None => default,
        }
    }

    /// Reads a three-component vector, falling back to `default`.
    pub fn get_vec3(&self, name: &str, default: [f32; 3]) -> [f32; 3] {
        let Some(Value::Array(items)) = self.vars.get(name) else {
            return default;
        };
        if items.len() != 3 {
            return default;
        }
        let mut out = default;
        for (slot, item) in out.iter_mut().zip(items) {
            match item.as_f64() {
                Some(value) => *slot = value as f32,
                None => return default,
            }
        }
        out
    }

    /// Reads a string, falling back to `default`.
    pub fn get_string(&self, name: &str, default: &str) -> String {
        match self.vars.get(name) {
            Some(Value::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    /// Iterates all variables in name order, for console listing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }
}
