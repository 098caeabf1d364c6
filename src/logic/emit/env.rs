use crate::logic::emit::database;
use crate::model::ExportOptions;

/// `.env` contents: the port when env mode is on, then the empty variables
/// of the selected database. Empty when neither applies.
pub fn env_file(options: &ExportOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    if options.use_env {
        lines.push(format!("PORT={}", options.api.port));
    }
    if let Some(db_type) = options.db.active() {
        lines.extend(
            database::template(db_type)
                .env_vars
                .iter()
                .map(|var| format!("{}=", var)),
        );
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
