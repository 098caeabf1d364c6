use crate::logic::emit::database;
use crate::logic::PathResolver;
use crate::model::{
    ComponentGraph, EndpointData, ExportOptions, Node, ParameterType, ResponseField,
};

const ENV_BOOTSTRAP: &str = "require('dotenv').config();\n";

const FRAMEWORK_BOOTSTRAP: &str = "\
const express = require('express');

const app = express();
app.use(express.json());
";

pub fn server_source(graph: &ComponentGraph, options: &ExportOptions) -> String {
    let mut out = String::new();

    out.push_str(&header(options));
    out.push('\n');

    if options.needs_env_bootstrap() {
        out.push_str(ENV_BOOTSTRAP);
        out.push('\n');
    }

    out.push_str(FRAMEWORK_BOOTSTRAP);
    out.push('\n');

    if let Some(db_type) = options.db.active() {
        out.push_str(database::template(db_type).connector);
        out.push('\n');
    }

    for node in graph.endpoints() {
        if let Some(endpoint) = node.as_endpoint() {
            out.push_str(&endpoint_block(graph, node, endpoint));
            out.push('\n');
        }
    }

    out.push_str(&listener(options));
    out
}

fn header(options: &ExportOptions) -> String {
    let mut header = format!("/**\n * {}\n", block_comment_text(&options.api.name));
    if let Some(description) = options
        .api
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        header.push_str(&format!(" * {}\n", block_comment_text(description)));
    }
    header.push_str(" *\n * Generated with route-forge\n */\n");
    header
}

fn endpoint_block(graph: &ComponentGraph, node: &Node, endpoint: &EndpointData) -> String {
    let full_path = PathResolver::endpoint_path(graph, node);
    let mut block = format!("// {} {}\n", endpoint.method, single_line(&full_path));

    let params = endpoint.active_params();
    if !params.is_empty() {
        block.push_str(&format!(
            "// {}: {}\n",
            parameter_label(endpoint.parameter_type),
            single_line(&params.join(", "))
        ));
    }

    block.push_str(&format!(
        "app.{}('{}', async (req, res) => {{\n",
        endpoint.method.handler_name(),
        escape_single_quoted(&full_path)
    ));

    for name in params {
        block.push_str(&format!(
            "  // {}\n",
            parameter_hint(endpoint.parameter_type, name)
        ));
    }

    block.push_str(&format!(
        "  try {{\n    res.status({}).json({});\n  }} catch (error) {{\n    res.status({}).json({});\n  }}\n}});\n",
        endpoint.success_response.status_code,
        json_object_literal(&endpoint.success_response.fields),
        endpoint.error_response.status_code,
        json_object_literal(&endpoint.error_response.fields),
    ));

    block
}

fn listener(options: &ExportOptions) -> String {
    let port = if options.use_env {
        format!("process.env.PORT || {}", options.api.port)
    } else {
        options.api.port.to_string()
    };
    format!(
        "const PORT = {};\n\napp.listen(PORT, () => {{\n  console.log(`Server running on port ${{PORT}}`);\n}});\n",
        port
    )
}

fn parameter_label(source: ParameterType) -> &'static str {
    match source {
        ParameterType::None => "Parameters",
        ParameterType::Route => "Route parameters",
        ParameterType::Query => "Query parameters",
        ParameterType::Body => "Body parameters",
        ParameterType::Headers => "Header parameters",
    }
}

/// Commented extraction line for one parameter, e.g. `const id = req.params.id;`
pub(crate) fn parameter_hint(source: ParameterType, name: &str) -> String {
    let variable = js_identifier(name);
    let access = match source {
        ParameterType::Headers => {
            return format!(
                "const {} = req.headers['{}'];",
                variable,
                escape_single_quoted(&name.to_lowercase())
            )
        }
        ParameterType::Route => "req.params",
        ParameterType::Query => "req.query",
        ParameterType::Body => "req.body",
        ParameterType::None => "req",
    };
    if is_js_identifier(name) {
        format!("const {} = {}.{};", variable, access, name)
    } else {
        format!(
            "const {} = {}['{}'];",
            variable,
            access,
            escape_single_quoted(name)
        )
    }
}

/// Render response fields as a one-line object literal in field order.
/// Values that already parse as JSON are emitted as written, anything else
/// becomes a string literal.
pub(crate) fn json_object_literal(fields: &[ResponseField]) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = fields
        .iter()
        .map(|field| format!("{}: {}", json_string(&field.key), json_value(&field.value)))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

fn json_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        trimmed.to_string()
    } else {
        json_string(raw)
    }
}

fn json_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

/// Body of a single-quoted JS string literal. Line terminators are escaped
/// because a raw one ends the literal.
fn escape_single_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => push_line_safe(&mut out, c),
        }
    }
    out
}

/// Text for a `//` comment, kept on one line
fn single_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        push_line_safe(&mut out, c);
    }
    out
}

/// Text for the `/** */` header: one line, and unable to close the comment
fn block_comment_text(raw: &str) -> String {
    single_line(raw).replace("*/", "*\\/")
}

fn push_line_safe(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{2028}' => out.push_str("\\u2028"),
        '\u{2029}' => out.push_str("\\u2029"),
        _ => out.push(c),
    }
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn js_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
