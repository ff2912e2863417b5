//! Declarative structural validation for YAML documents.
//!
//! A [`Schema`] describes the expected shape of a document (mappings with
//! required and optional keys, lists, strings) as plain data. [`Schema::validate`]
//! walks a [`serde_yaml::Value`] against it and reports the first mismatch as a
//! [`SchemaError`] carrying the path to the offending value.

use std::fmt;

use serde_yaml::Value;

/// Expected shape of a YAML value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// A YAML string. Numbers, booleans and tagged values do not qualify.
    Str,
    /// A sequence whose every element matches the inner schema.
    List(Box<Schema>),
    /// A mapping with a closed set of string keys.
    Map(Vec<Field>),
}

/// One key of a [`Schema::Map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub required: bool,
    pub schema: Schema,
}

impl Field {
    pub fn required(key: &'static str, schema: Schema) -> Self {
        Self {
            key,
            required: true,
            schema,
        }
    }

    pub fn optional(key: &'static str, schema: Schema) -> Self {
        Self {
            key,
            required: false,
            schema,
        }
    }
}

/// Location of a value inside the validated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A validation failure: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    path: Vec<PathSegment>,
    reason: String,
}

impl SchemaError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            reason: reason.into(),
        }
    }

    /// Path from the document root to the offending value, e.g. `departures[0].stopid`.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
            }
        }
        out
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.reason)
        } else {
            write!(f, "Key '{}' error: {}", self.path(), self.reason)
        }
    }
}

impl std::error::Error for SchemaError {}

impl Schema {
    pub fn list(inner: Schema) -> Self {
        Schema::List(Box::new(inner))
    }

    /// Checks `value` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first mismatch found. Within a mapping, values of known keys
    /// are checked in document order, then missing required keys, then unknown
    /// keys.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        match self {
            Schema::Str => match value {
                Value::String(_) => Ok(()),
                other => Err(SchemaError::new(format!(
                    "{} should be instance of 'str'",
                    render(other)
                ))),
            },
            Schema::List(inner) => {
                let Value::Sequence(items) = value else {
                    return Err(SchemaError::new(format!(
                        "{} should be instance of 'list'",
                        render(value)
                    )));
                };
                for (index, item) in items.iter().enumerate() {
                    inner
                        .validate(item)
                        .map_err(|e| e.within(PathSegment::Index(index)))?;
                }
                Ok(())
            }
            Schema::Map(fields) => validate_mapping(fields, value),
        }
    }
}

fn validate_mapping(fields: &[Field], value: &Value) -> Result<(), SchemaError> {
    let Value::Mapping(mapping) = value else {
        return Err(SchemaError::new(format!(
            "{} should be instance of 'dict'",
            render(value)
        )));
    };

    let mut seen: Vec<&str> = Vec::with_capacity(mapping.len());
    let mut wrong: Vec<String> = Vec::new();

    for (key, item) in mapping {
        let field = key
            .as_str()
            .and_then(|name| fields.iter().find(|f| f.key == name));
        match field {
            Some(field) => {
                field
                    .schema
                    .validate(item)
                    .map_err(|e| e.within(PathSegment::Key(field.key.to_string())))?;
                seen.push(field.key);
            }
            None => wrong.push(render(key)),
        }
    }

    let mut missing: Vec<String> = fields
        .iter()
        .filter(|f| f.required && !seen.contains(&f.key))
        .map(|f| format!("'{}'", f.key))
        .collect();
    if !missing.is_empty() {
        missing.sort();
        let noun = if missing.len() == 1 { "key" } else { "keys" };
        return Err(SchemaError::new(format!(
            "Missing {noun}: {}",
            missing.join(", ")
        )));
    }

    if !wrong.is_empty() {
        let noun = if wrong.len() == 1 { "key" } else { "keys" };
        return Err(SchemaError::new(format!(
            "Wrong {noun} {} in {}",
            wrong.join(", "),
            render(value)
        )));
    }

    Ok(())
}

/// Renders a value on one line for error messages.
fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let entries: Vec<String> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", render(k), render(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, render(&tagged.value)),
    }
}
