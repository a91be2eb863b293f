//! Parameter metadata, derived from operation struct fields

use serde_json::{json, Value};

/// JSON-level type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
}

impl ParamType {
    /// JSON Schema type name
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// Metadata about one parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Field name
    pub name: &'static str,
    /// Description (from the field's doc comment)
    pub description: &'static str,
    pub param_type: ParamType,
    /// Whether required (non-Option field)
    pub required: bool,
    /// Alternative input names
    pub aliases: &'static [&'static str],
}

impl ParamMeta {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            param_type: ParamType::String,
            required: false,
            aliases: &[],
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn description(mut self, desc: &'static str) -> Self {
        self.description = desc;
        self
    }

    pub const fn aliases(mut self, a: &'static [&'static str]) -> Self {
        self.aliases = a;
        self
    }

    pub const fn param_type(mut self, t: ParamType) -> Self {
        self.param_type = t;
        self
    }

    /// JSON Schema fragment for this parameter
    pub fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.param_type.json_type(),
            "description": self.description,
        });
        if !self.aliases.is_empty() {
            schema["aliases"] = json!(self.aliases);
        }
        schema
    }
}

/// JSON Schema object for a whole parameter list
pub fn params_schema(params: &[ParamMeta]) -> Value {
    let properties: serde_json::Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), p.schema()))
        .collect();
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: [ParamMeta; 2] = [
        ParamMeta::new("id")
            .description("Task id")
            .param_type(ParamType::String)
            .required(),
        ParamMeta::new("position")
            .description("Target position")
            .param_type(ParamType::Integer)
            .aliases(&["index"]),
    ];

    #[test]
    fn test_params_schema() {
        let schema = params_schema(&PARAMS);
        assert_eq!(schema["properties"]["position"]["type"], "integer");
        assert_eq!(schema["properties"]["position"]["aliases"][0], "index");
        assert_eq!(schema["required"], json!(["id"]));
    }
}
