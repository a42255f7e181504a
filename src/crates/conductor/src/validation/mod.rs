//! Runtime validators built from tool input schemas.
//!
//! A [`ValidatorRegistry`] maps schema `type` names to validator factories.
//! [`ValidatorRegistry::build`] turns a [`ToolSchema`] into a
//! [`SchemaValidator`] that checks complete argument objects (before
//! execution) and partial ones (after each extraction).
//!
//! ```rust,ignore
//! let registry = ValidatorRegistry::default();
//! let validator = registry.build(&tool.input_schema);
//!
//! let kept = validator.validate_partial(&extracted)?;
//! let args = validator.validate_full(&state.collected_inputs)?;
//! ```
//!
//! Schemas are never rejected: a property with an unknown or missing type,
//! or a fragment that is not an object, validates as "accept anything".

pub mod kinds;

use crate::missing::is_missing;
use kinds::{AnyValue, Boolean, NonEmptyString, Numeric, OneOf};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tooling::ToolSchema;

/// Validation rule for a single argument value.
pub trait FieldValidator: Send + Sync {
    /// Schema kind this validator enforces, for logs.
    fn kind(&self) -> &'static str;

    /// Check `value`, returning the value to store.
    ///
    /// Validators may normalise (trim strings, parse numeric strings) but
    /// never invent a value.
    fn check(&self, field: &str, value: &Value) -> Result<Value, String>;
}

/// Builds a validator from a property's schema fragment.
pub type ValidatorFactory = fn(&Map<String, Value>) -> Box<dyn FieldValidator>;

/// Reasons an argument object fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required parameters: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Registry of field kinds.
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl Default for ValidatorRegistry {
    /// Registry with `string`, `number`, `boolean` and `enum`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("string", string_factory);
        registry.register("number", number_factory);
        registry.register("boolean", boolean_factory);
        registry.register("enum", enum_factory);
        registry
    }
}

fn string_factory(_: &Map<String, Value>) -> Box<dyn FieldValidator> {
    Box::new(NonEmptyString)
}

fn number_factory(_: &Map<String, Value>) -> Box<dyn FieldValidator> {
    Box::new(Numeric)
}

fn boolean_factory(_: &Map<String, Value>) -> Box<dyn FieldValidator> {
    Box::new(Boolean)
}

fn enum_factory(fragment: &Map<String, Value>) -> Box<dyn FieldValidator> {
    match fragment.get("enum") {
        Some(Value::Array(options)) if !options.is_empty() => Box::new(OneOf::new(options.clone())),
        _ => Box::new(AnyValue),
    }
}

impl ValidatorRegistry {
    /// Registry without any kinds; every field accepts anything.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for a schema `type` name.
    pub fn register(&mut self, kind: impl Into<String>, factory: ValidatorFactory) {
        self.factories.insert(kind.into(), factory);
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn field_validator(&self, fragment: &Value) -> Box<dyn FieldValidator> {
        let Value::Object(fragment) = fragment else {
            return Box::new(AnyValue);
        };

        // A declared option list constrains the field whatever its type says.
        if matches!(fragment.get("enum"), Some(Value::Array(options)) if !options.is_empty()) {
            if let Some(factory) = self.factories.get("enum") {
                return factory(fragment);
            }
        }

        fragment
            .get("type")
            .and_then(Value::as_str)
            .and_then(|kind| self.factories.get(kind))
            .map(|factory| factory(fragment))
            .unwrap_or_else(|| Box::new(AnyValue))
    }

    /// Build the validator for a tool schema.
    pub fn build(&self, schema: &ToolSchema) -> SchemaValidator {
        let fields = schema
            .properties
            .iter()
            .map(|(name, fragment)| (name.clone(), self.field_validator(fragment)))
            .collect();

        SchemaValidator {
            fields,
            required: schema.required.clone(),
        }
    }
}

/// Validator for one tool's argument object.
pub struct SchemaValidator {
    fields: Vec<(String, Box<dyn FieldValidator>)>,
    required: Vec<String>,
}

impl SchemaValidator {
    fn field(&self, name: &str) -> Option<&dyn FieldValidator> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_ref())
    }

    /// Kind of each declared field, in declaration order.
    pub fn field_kinds(&self) -> Vec<(&str, &'static str)> {
        self.fields
            .iter()
            .map(|(n, v)| (n.as_str(), v.kind()))
            .collect()
    }

    /// Validate a partial object: no required-field enforcement.
    ///
    /// Undeclared keys are dropped, as are null and blank values. Every
    /// remaining value must pass its field's validator.
    pub fn validate_partial(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut kept = Map::new();
        for (name, value) in input {
            let Some(validator) = self.field(name) else {
                continue;
            };
            if is_missing(Some(value)) {
                continue;
            }
            let checked = validator
                .check(name, value)
                .map_err(|reason| ValidationError::InvalidField {
                    field: name.clone(),
                    reason,
                })?;
            kept.insert(name.clone(), checked);
        }
        Ok(kept)
    }

    /// Validate a complete object: every required field present and valid.
    pub fn validate_full(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| is_missing(input.get(name.as_str())))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired(missing));
        }
        self.validate_partial(input)
    }
}
