//! Option tables.

use clidef_core::{OptionKind, OptionRecord, OptionSchema, normalize_option_record};

use crate::format::{Row, format_rows};

/// Renders a command's options under an `OPTIONS:` header, or
/// `(No options)` when there are none.
///
/// # Examples
///
/// ```
/// use clidef_core::{OptionRecord, OptionSchema};
/// use clidef_help::render_options;
///
/// let mut options = OptionRecord::new();
/// options.insert("name", OptionSchema::string().with_alias('n').with_description("Who to greet"));
///
/// assert_eq!(render_options(&options), "OPTIONS:\n  --name (-n)  Who to greet");
/// assert_eq!(render_options(&OptionRecord::new()), "(No options)");
/// ```
pub fn render_options(options: &OptionRecord) -> String {
    if options.is_empty() {
        return "(No options)".to_string();
    }
    render_section("OPTIONS:", options)
}

/// Renders options under a `GLOBAL OPTIONS:` header.
pub fn render_global_options(options: &OptionRecord) -> String {
    render_section("GLOBAL OPTIONS:", options)
}

fn render_section(header: &str, options: &OptionRecord) -> String {
    let rows: Vec<Row> = normalize_option_record(options)
        .iter()
        .map(|(name, schema)| option_row(name, schema))
        .collect();

    std::iter::once(header.to_string())
        .chain(format_rows(&rows))
        .collect::<Vec<_>>()
        .join("\n")
}

fn option_row(name: &str, schema: &OptionSchema) -> Row {
    let mut head = format!("--{name}");
    if !schema.alias.is_empty() {
        let aliases: Vec<String> = schema.alias.iter().map(|c| format!("-{c}")).collect();
        head.push_str(&format!(" ({})", aliases.join(",")));
    }

    let mut meta = Vec::new();
    if schema.required {
        meta.push("required".to_string());
    }
    if let OptionKind::Enum(opt) = &schema.kind {
        meta.push(format!("choices: {}", opt.choices.join("|")));
    }
    if let Some(default) = schema.default_value() {
        meta.push(format!("default: {default}"));
    }

    let mut right: Vec<String> = schema.description.iter().cloned().collect();
    if !meta.is_empty() {
        right.push(format!("[{}]", meta.join(", ")));
    }

    Row::new(head, right.join(" "))
}
