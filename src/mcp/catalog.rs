use crate::errors::McpError;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static [ToolDef] {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_CATALOG.iter().find(|tool| tool.name == name)
}

/// Checks call arguments against the tool's input schema. A missing or null
/// argument object is treated as `{}`.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    let empty = Value::Object(Default::default());
    let instance = if args.is_null() { &empty } else { args };
    if let Err(errors) = schema.validate(instance) {
        let rendered: Vec<String> = errors
            .take(10)
            .map(|err| {
                let path = err.instance_path.to_string();
                let path = if path.is_empty() { "(root)".to_string() } else { path };
                format!("{}: {}", path, err)
            })
            .collect();
        return Err(McpError::invalid_params(format!(
            "Invalid arguments for {}\n{}",
            tool_name,
            rendered.join("\n")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_three_tools() {
        let names: Vec<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["query_search_analytics", "list_sites", "list_sitemaps"]
        );
        assert_eq!(TOOL_VALIDATORS.len(), 3, "every schema must compile");
    }

    #[test]
    fn query_requires_dates() {
        let err = validate_tool_args(
            "query_search_analytics",
            &serde_json::json!({ "site_url": "x.com" }),
        )
        .expect_err("dates are required");
        assert!(err.message.contains("start_date"));
    }

    #[test]
    fn list_sites_accepts_null_args() {
        assert!(validate_tool_args("list_sites", &Value::Null).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = validate_tool_args(
            "list_sitemaps",
            &serde_json::json!({ "site_url": "x.com", "site": "x.com" }),
        )
        .expect_err("unknown field");
        assert!(err.message.starts_with("Invalid arguments for list_sitemaps"));
    }

    #[test]
    fn dimensions_must_be_known() {
        let args = serde_json::json!({
            "site_url": "x.com",
            "start_date": "2025-01-01",
            "end_date": "2025-01-31",
            "dimensions": ["query", "browser"]
        });
        assert!(validate_tool_args("query_search_analytics", &args).is_err());
    }
}
