use crate::logic::emit::{database, env};
use crate::logic::PathResolver;
use crate::model::{ComponentGraph, ExportOptions};

/// File name the README tells the user to save the server source under
pub const SERVER_FILE_NAME: &str = "server.js";

/// npm packages the generated server needs, in install order
pub fn dependencies(options: &ExportOptions) -> Vec<&'static str> {
    let mut packages = vec!["express"];
    if options.needs_env_bootstrap() {
        packages.push("dotenv");
    }
    if let Some(db_type) = options.db.active() {
        packages.push(database::template(db_type).package);
    }
    packages
}

pub fn readme(graph: &ComponentGraph, options: &ExportOptions) -> String {
    let mut out = format!("# {}\n\n", options.api.name);

    if let Some(description) = options
        .api
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        out.push_str(&format!("{}\n\n", description));
    }

    out.push_str(&format!(
        "## Installation\n\n```bash\nnpm init -y\nnpm install {}\n```\n\n",
        dependencies(options).join(" ")
    ));

    if let Some(db_type) = options.db.active() {
        out.push_str(&format!(
            "The server connects to {} on startup and logs whether the connection succeeded.\n\n",
            db_type.display_name()
        ));
    }

    let env_text = env::env_file(options);
    if !env_text.is_empty() {
        out.push_str(&format!(
            "## Configuration\n\nCreate a `.env` file next to `{}` and fill in the values:\n\n```\n{}```\n\n",
            SERVER_FILE_NAME, env_text
        ));
    }

    out.push_str(&format!(
        "## Running\n\n```bash\nnode {}\n```\n\nThe server listens on port {}.\n\n",
        SERVER_FILE_NAME, options.api.port
    ));

    out.push_str("## Endpoints\n\n");
    let rows: Vec<String> = graph
        .endpoints()
        .filter_map(|node| {
            node.as_endpoint().map(|endpoint| {
                format!(
                    "| {} | `{}` | {} |",
                    endpoint.method,
                    PathResolver::endpoint_path(graph, node).replace('|', "\\|"),
                    endpoint.success_response.status_code
                )
            })
        })
        .collect();

    if rows.is_empty() {
        out.push_str("No endpoints defined.\n");
    } else {
        out.push_str("| Method | Path | Status |\n|---|---|---|\n");
        out.push_str(&rows.join("\n"));
        out.push('\n');
    }

    out
}
