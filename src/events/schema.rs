// Copyright (c) 2025 - Cowboy AI, Inc.

//! Payload schemas for event input validation
//!
//! A [`Schema`] is a named record of typed fields. Automated actions declare
//! theirs ahead of time; manual commands get one synthesized from the single
//! handler's parameter list. Validating an inbound payload yields the keyword
//! arguments the handler is called with.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Keyword arguments delivered to a handler
pub type Kwargs = Map<String, Value>;

/// Errors raised when a payload does not match its schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The payload is not valid JSON
    #[error("payload is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    /// The payload is JSON but not an object
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required field is absent
    #[error("missing required field {0:?}")]
    MissingField(String),

    /// A field has the wrong JSON type
    #[error("field {field:?} expected {expected}, got {found}")]
    WrongType {
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    /// A key not declared by the schema is present and extras are forbidden
    #[error("unknown field {0:?}")]
    UnknownField(String),
}

/// Declared type of a schema field or handler parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    /// Accepts any JSON number
    Float,
    String,
    Boolean,
    /// RFC 3339 timestamp carried as a string
    DateTime,
    /// Unconstrained JSON value
    Any,
}

impl FieldType {
    /// Check whether a JSON value is acceptable for this type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::DateTime => value
                .as_str()
                .map(|raw| chrono::DateTime::parse_from_rfc3339(raw).is_ok())
                .unwrap_or(false),
            FieldType::Any => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Any => write!(f, "any"),
        }
    }
}

/// A single named field of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    /// Whether the payload must carry the field
    pub required: bool,
}

/// How keys outside the declared fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFields {
    /// Drop them silently
    Ignore,
    /// Reject the payload
    Forbid,
}

/// A named record type describing an event's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    extra: ExtraFields,
}

impl Schema {
    /// Create an empty schema that ignores unknown keys
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            extra: ExtraFields::Ignore,
        }
    }

    /// Add a required field
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            required: true,
        });
        self
    }

    /// Add a field that may be omitted
    pub fn optional_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            required: false,
        });
        self
    }

    /// Reject payloads carrying undeclared keys
    pub fn forbid_extra(mut self) -> Self {
        self.extra = ExtraFields::Forbid;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn extra(&self) -> ExtraFields {
        self.extra
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Parse raw message bytes and validate them against the schema
    pub fn validate(&self, payload: &[u8]) -> Result<Kwargs, SchemaError> {
        let value: Value = serde_json::from_slice(payload)?;
        self.validate_value(value)
    }

    /// Validate an already parsed JSON value
    ///
    /// The returned map holds only declared fields present in the payload.
    pub fn validate_value(&self, value: Value) -> Result<Kwargs, SchemaError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(SchemaError::NotAnObject(json_kind(&other))),
        };

        if self.extra == ExtraFields::Forbid {
            if let Some(unknown) = object.keys().find(|key| self.get(key).is_none()) {
                return Err(SchemaError::UnknownField(unknown.clone()));
            }
        }

        let mut kwargs = Kwargs::new();
        for field in &self.fields {
            match object.remove(&field.name) {
                Some(value) => {
                    if !field.ty.accepts(&value) {
                        return Err(SchemaError::WrongType {
                            field: field.name.clone(),
                            expected: field.ty,
                            found: json_kind(&value),
                        });
                    }
                    kwargs.insert(field.name.clone(), value);
                }
                None if field.required => {
                    return Err(SchemaError::MissingField(field.name.clone()));
                }
                None => {}
            }
        }

        Ok(kwargs)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
