//! OpenAPI document generation.
//!
//! A pure function of the gateway configuration: nothing here touches the
//! filesystem or the runner.

use crate::dispatch::Gateway;
use crate::root::RootResolver;
use crate::tools::{InputKind, ToolAction, ToolDefinition};
use serde_json::{json, Map, Value};

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Build the OpenAPI document for every configured tool.
pub fn openapi(gateway: &Gateway, server_url: &str) -> Value {
    let mut paths = Map::new();
    for tool in gateway.tools() {
        paths.insert(
            format!("/tools/{}", tool.name),
            json!({ "post": operation(tool, gateway.resolver()) }),
        );
    }

    let limits = gateway.limits();
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "proc_gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "description": format!(
                "Runs configured command-line tools in allow-listed directories. \
                 Standard output is limited to {} characters; lines longer than {} \
                 characters are omitted.",
                limits.max_output_chars, limits.drop_line_chars
            ),
        },
        "servers": [{ "url": server_url }],
        "paths": paths,
        "components": { "schemas": component_schemas() },
    })
}

fn operation(tool: &ToolDefinition, resolver: &RootResolver) -> Value {
    let (body, ok_ref) = match &tool.action {
        ToolAction::ListRoots => (
            json!({ "type": "object", "properties": {}, "additionalProperties": false }),
            "#/components/schemas/RootListing",
        ),
        ToolAction::Exec { input, .. } => (
            exec_body(tool, *input, resolver),
            "#/components/schemas/ExecutionResult",
        ),
    };

    let mut responses = Map::new();
    responses.insert(
        "200".into(),
        json!({
            "description": "Tool result",
            "content": { "application/json": { "schema": { "$ref": ok_ref } } },
        }),
    );
    responses.insert("400".into(), error_response("Malformed request body"));
    if matches!(tool.action, ToolAction::Exec { .. }) {
        responses.insert("404".into(), error_response("Root does not exist"));
        // Forced roots are allow-listed at build and never use the default
        if tool.accepts_root() {
            responses.insert("403".into(), error_response("Root not allowed"));
            responses.insert("500".into(), error_response("Default root does not exist"));
        }
    }

    let summary = if tool.description.is_empty() {
        format!("Run {}", tool.name)
    } else {
        tool.description.clone()
    };

    json!({
        "operationId": tool.name,
        "summary": summary,
        "requestBody": {
            "required": false,
            "content": { "application/json": { "schema": body } },
        },
        "responses": responses,
    })
}

fn exec_body(tool: &ToolDefinition, input: InputKind, resolver: &RootResolver) -> Value {
    let mut properties = Map::new();

    if tool.accepts_root() {
        properties.insert("root".into(), root_property(resolver));
    }

    match input {
        InputKind::Arguments => {
            let generic = json!({ "type": "array", "items": { "type": "string" } });
            properties.insert(
                "args".into(),
                input_property(tool, generic, "Arguments appended to the command"),
            );
        }
        InputKind::Stdin => {
            let generic = json!({ "type": "string" });
            properties.insert(
                "input".into(),
                input_property(tool, generic, "Text piped to the command's standard input"),
            );
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

/// Declared parameter schema, else the generic shape. `args_help` fills in a
/// missing description.
fn input_property(tool: &ToolDefinition, generic: Value, fallback_help: &str) -> Value {
    let mut property = tool.parameters.clone().unwrap_or(generic);
    if let Value::Object(fields) = &mut property {
        if !fields.contains_key("description") {
            let help = tool.args_help.as_deref().unwrap_or(fallback_help);
            fields.insert("description".into(), Value::from(help));
        }
    }
    property
}

fn root_property(resolver: &RootResolver) -> Value {
    let mut description = String::from("Working directory. One of:");
    for root in resolver.roots() {
        description.push_str(&format!("\n- {} ({})", root.path, root.name));
        if !root.description.is_empty() {
            description.push_str(&format!(": {}", root.description));
        }
        if !root.keywords.is_empty() {
            description.push_str(&format!(" [{}]", root.keywords.join(", ")));
        }
    }

    let paths: Vec<&str> = resolver.roots().iter().map(|r| r.path.as_str()).collect();
    json!({
        "type": "string",
        "enum": paths,
        "default": resolver.default_root(),
        "description": description,
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/Denial" } }
        },
    })
}

fn component_schemas() -> Value {
    json!({
        "ExecutionResult": {
            "type": "object",
            "required": ["code", "out", "err"],
            "properties": {
                "code": { "type": "integer", "description": "Exit code; -1 if the command could not be started" },
                "out": { "type": "string", "description": "Standard output, bounded" },
                "err": { "type": "string", "description": "Standard error, or the start failure message" },
            },
        },
        "RootListing": {
            "type": "object",
            "required": ["roots"],
            "properties": {
                "roots": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["path", "name", "description", "keywords"],
                        "properties": {
                            "path": { "type": "string" },
                            "name": { "type": "string" },
                            "description": { "type": "string" },
                            "keywords": { "type": "array", "items": { "type": "string" } },
                        },
                    },
                },
            },
        },
        "Denial": {
            "type": "object",
            "required": ["error"],
            "properties": {
                "error": { "type": "string" },
                "root": { "type": "string" },
                "tool": { "type": "string" },
            },
        },
    })
}
