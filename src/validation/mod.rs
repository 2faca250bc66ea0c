//! Declarative validation of JSON request bodies.
//!
//! A [`ValidationSchema`] is a static list of [`Field`] descriptors. [`validate`]
//! walks the fields in declaration order, collects every violation instead of
//! stopping at the first one, and on success returns the body reduced to the
//! declared fields with numeric and boolean strings coerced.

pub mod schemas;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use validator::{validate_email, validate_length, validate_range, validate_url};

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Text {
        non_empty: bool,
        max_len: Option<u64>,
    },
    Email,
    Url,
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    OneOf(&'static [&'static str]),
    TextList,
    Bool,
}

impl Rule {
    pub const NON_EMPTY: Rule = Rule::Text {
        non_empty: true,
        max_len: None,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, rule: Rule) -> Field {
        Field {
            name,
            rule,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Field {
        Field {
            name,
            rule,
            required: false,
        }
    }
}

#[derive(Debug)]
pub struct ValidationSchema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Violation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request body failed validation on {} field(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn body(reason: impl Into<String>) -> Self {
        ValidationError {
            violations: vec![Violation::new("body", reason)],
        }
    }
}

pub fn validate(schema: &ValidationSchema, body: &Value) -> Result<Document, ValidationError> {
    let object = body
        .as_object()
        .ok_or_else(|| ValidationError::body("must be a JSON object"))?;

    let mut validated = Document::new();
    let mut violations = Vec::new();

    for field in schema.fields {
        match object.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    violations.push(Violation::new(field.name, "is required"));
                }
            }
            Some(value) => match check(&field.rule, value) {
                Ok(coerced) => {
                    validated.insert(field.name.to_string(), coerced);
                }
                Err(reason) => violations.push(Violation::new(field.name, reason)),
            },
        }
    }

    if violations.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationError { violations })
    }
}

fn check(rule: &Rule, value: &Value) -> Result<Value, String> {
    match *rule {
        Rule::Text { non_empty, max_len } => {
            let text = value.as_str().ok_or("must be a string")?;
            if non_empty && text.trim().is_empty() {
                return Err("must not be empty".into());
            }
            if let Some(max) = max_len {
                if !validate_length(text, None, Some(max), None) {
                    return Err(format!("must be at most {max} characters"));
                }
            }
            Ok(value.clone())
        }
        Rule::Email => {
            let text = value.as_str().ok_or("must be a string")?.trim();
            if !validate_email(text) {
                return Err("must be a valid email".into());
            }
            Ok(Value::String(text.to_string()))
        }
        Rule::Url => {
            let text = value.as_str().ok_or("must be a string")?;
            if !validate_url(text) {
                return Err("must be a valid URL".into());
            }
            Ok(value.clone())
        }
        Rule::Integer { min, max } => {
            let number = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or("must be an integer")?;
            if !validate_range(number, min, max) {
                return Err(range_reason(min, max));
            }
            Ok(Value::from(number))
        }
        Rule::Number { min, max } => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or("must be a number")?;
            if !validate_range(number, min, max) {
                return Err(range_reason(min, max));
            }
            match value {
                Value::Number(_) => Ok(value.clone()),
                _ => Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| "must be a number".to_string()),
            }
        }
        Rule::OneOf(options) => {
            let text = value.as_str().ok_or("must be a string")?;
            if !options.iter().any(|option| *option == text) {
                return Err(format!("must be one of: {}", options.join(", ")));
            }
            Ok(value.clone())
        }
        Rule::TextList => {
            let items = value.as_array().ok_or("must be a list of strings")?;
            if items
                .iter()
                .any(|item| item.as_str().map_or(true, |s| s.trim().is_empty()))
            {
                return Err("must be a list of non-empty strings".into());
            }
            Ok(value.clone())
        }
        Rule::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s == "true" => Ok(Value::Bool(true)),
            Value::String(s) if s == "false" => Ok(Value::Bool(false)),
            _ => Err("must be a boolean".into()),
        },
    }
}

fn range_reason<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("must be between {min} and {max}"),
        (Some(min), None) => format!("must be at least {min}"),
        (None, Some(max)) => format!("must be at most {max}"),
        (None, None) => "is out of range".to_string(),
    }
}
