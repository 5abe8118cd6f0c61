//! Declarative argument schemas
//!
//! Each tool declares its arguments as an explicit field list instead of
//! deriving a shape from a validation library at runtime. The same
//! descriptor drives validation and the JSON-Schema object reported by
//! `tools/list`.

use serde_json::{json, Map, Value};

/// Argument field type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }
}

/// One declared argument field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: Option<String>,
    /// Minimum length of the trimmed string value
    pub min_len: Option<usize>,
    /// Maximum length of the raw string value
    pub max_len: Option<usize>,
    /// Allowed values, applied to strings or to every array element
    pub one_of: Option<Vec<String>>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: None,
            min_len: None,
            max_len: None,
            one_of: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Array)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Object)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Collect every violation of this field against a present value
    fn check(&self, value: &Value, violations: &mut Vec<String>) {
        let name = &self.name;

        let type_ok = match self.kind {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        };
        if !type_ok {
            violations.push(format!("{name}: expected {}", self.kind.type_name()));
            return;
        }

        if let Some(s) = value.as_str() {
            if let Some(min) = self.min_len {
                if s.trim().chars().count() < min {
                    violations.push(format!("{name}: must be at least {min} characters"));
                }
            }
            if let Some(max) = self.max_len {
                if s.chars().count() > max {
                    violations.push(format!("{name}: must be at most {max} characters"));
                }
            }
            if let Some(allowed) = &self.one_of {
                if !allowed.iter().any(|a| a == s) {
                    violations.push(format!(
                        "{name}: must be one of [{}]",
                        allowed.join(", ")
                    ));
                }
            }
        }

        if let Some(items) = value.as_array() {
            if let Some(allowed) = &self.one_of {
                for item in items {
                    match item.as_str() {
                        Some(s) if allowed.iter().any(|a| a == s) => {}
                        Some(s) => violations.push(format!(
                            "{name}: '{s}' is not one of [{}]",
                            allowed.join(", ")
                        )),
                        None => violations.push(format!("{name}: elements must be strings")),
                    }
                }
            }
        }
    }
}

/// Ordered argument schema for one tool
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    fields: Vec<FieldSpec>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate arguments, reporting every violated field at once
    pub fn validate(&self, args: &Value) -> Result<(), Vec<String>> {
        let object = match args.as_object() {
            Some(object) => object,
            None => return Err(vec!["arguments must be an object".to_string()]),
        };

        let mut violations = Vec::new();

        for field in &self.fields {
            match object.get(&field.name) {
                Some(Value::Null) | None => {
                    if field.required {
                        violations.push(format!("{}: required field is missing", field.name));
                    }
                }
                Some(value) => field.check(value, &mut violations),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// JSON-Schema-shaped object for `tools/list`
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut spec = Map::new();
            spec.insert("type".to_string(), json!(field.kind.type_name()));
            if let Some(description) = &field.description {
                spec.insert("description".to_string(), json!(description));
            }
            properties.insert(field.name.clone(), Value::Object(spec));

            if field.required {
                required.push(field.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
