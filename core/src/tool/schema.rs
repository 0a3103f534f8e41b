use serde_json::{json, Map, Value};

use crate::error::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// A string restricted to the listed values (matched case-insensitively).
    Enum(Vec<&'static str>),
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

/// Flat object schema for tool arguments.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: true,
            description,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
            description,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The field a bare string argument binds to: only when the schema has exactly
    /// one required field and it is a string.
    pub fn bare_string_field(&self) -> Option<&'static str> {
        let mut required = self.fields.iter().filter(|f| f.required);
        match (required.next(), required.next()) {
            (Some(f), None) if f.kind == FieldKind::String => Some(f.name),
            _ => None,
        }
    }

    /// Checks `raw` against the schema and returns a normalized JSON object.
    ///
    /// Unknown fields are dropped. Enum values are normalized to their declared
    /// spelling and `"true"`/`"false"` strings are accepted for booleans.
    pub fn validate(&self, tool: &str, raw: Value) -> Result<Value, ToolError> {
        let invalid = |message: String| ToolError::InvalidInput {
            tool: tool.to_string(),
            message,
        };

        let mut obj = match raw {
            Value::Object(map) => map,
            Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
                Ok(Value::Object(map)) => map,
                _ => {
                    let field = self.bare_string_field().ok_or_else(|| {
                        invalid("expected a JSON object with the declared fields".to_string())
                    })?;
                    let mut map = Map::new();
                    map.insert(field.to_string(), Value::String(s));
                    map
                }
            },
            Value::Null => Map::new(),
            other => {
                return Err(invalid(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
        };

        let mut out = Map::new();
        for field in &self.fields {
            match obj.remove(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(invalid(format!("missing required field '{}'", field.name)));
                    }
                }
                Some(value) => {
                    let value = coerce(field, value).map_err(invalid)?;
                    out.insert(field.name.to_string(), value);
                }
            }
        }

        if !obj.is_empty() {
            let ignored: Vec<&String> = obj.keys().collect();
            tracing::debug!(tool = %tool, ?ignored, "dropping undeclared tool arguments");
        }

        Ok(Value::Object(out))
    }

    /// JSON Schema rendering used in prompts.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for f in &self.fields {
            let mut prop = json!({
                "type": f.kind.type_name(),
                "description": f.description,
            });
            if let FieldKind::Enum(values) = &f.kind {
                prop["enum"] = json!(values);
            }
            properties.insert(f.name.to_string(), prop);
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn coerce(field: &FieldSpec, value: Value) -> Result<Value, String> {
    match (&field.kind, value) {
        (FieldKind::String, Value::String(s)) => Ok(Value::String(s)),
        (FieldKind::Number, Value::Number(n)) => Ok(Value::Number(n)),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (FieldKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("field '{}' must be a boolean", field.name)),
        },
        (FieldKind::Enum(allowed), Value::String(s)) => allowed
            .iter()
            .find(|a| a.eq_ignore_ascii_case(s.trim()))
            .map(|a| Value::String(a.to_string()))
            .ok_or_else(|| {
                format!(
                    "field '{}' must be one of: {}",
                    field.name,
                    allowed.join(", ")
                )
            }),
        (kind, other) => Err(format!(
            "field '{}' must be a {}, got {}",
            field.name,
            kind.type_name(),
            json_type(&other)
        )),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
