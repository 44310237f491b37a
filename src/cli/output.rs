//! Output rendering for CLI commands.
//!
//! Every command produces a serializable value. JSON and YAML render it as
//! is; table and plain output flatten it into rows and columns.

use super::args::Format;
use crate::core::{
    domain::error::{ProxmoxError, ProxmoxResult},
    infrastructure::config_store::ConfigTree,
};
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io::{self, Write};

/// How output is rendered for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    format: Format,
    color: bool,
}

impl RenderContext {
    pub const fn new(format: Format, color: bool) -> Self {
        Self { format, color }
    }

    /// Picks the format from the flag, then `output.format`, then JSON.
    /// Color follows `output.color` and is off whenever `NO_COLOR` is set.
    pub fn resolve(flag: Option<Format>, config: &ConfigTree) -> Self {
        let format = flag
            .or_else(|| {
                config
                    .get_str("output.format")
                    .and_then(|name| Format::from_name(&name))
            })
            .unwrap_or(Format::Json);
        let color = config.get_bool("output.color").unwrap_or(true)
            && std::env::var_os("NO_COLOR").is_none();
        Self::new(format, color)
    }

    pub const fn format(&self) -> Format {
        self.format
    }

    /// Whether styled output is wanted; applied once per process by the caller.
    pub const fn color(&self) -> bool {
        self.color
    }

    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Writes a value; `title` heads the table in table mode.
    pub fn write<W, T>(&self, writer: &mut W, value: &T, title: Option<&str>) -> ProxmoxResult<()>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value).map_err(io::Error::from)?;
                writeln!(writer)?;
            }
            Format::Yaml => {
                serde_yaml::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            }
            Format::Table => {
                let value = serde_json::to_value(value).map_err(io::Error::from)?;
                self.write_table(writer, &value, title)?;
            }
            Format::Plain => {
                let value = serde_json::to_value(value).map_err(io::Error::from)?;
                write_plain(writer, &value)?;
            }
        }
        Ok(())
    }

    /// Reports a completed mutation.
    pub fn write_outcome<W: Write>(&self, writer: &mut W, outcome: &Outcome) -> ProxmoxResult<()> {
        match self.format {
            Format::Json | Format::Yaml => self.write(writer, outcome, None),
            Format::Table | Format::Plain => {
                writeln!(writer, "{} {}", "✓".green(), outcome.message)?;
                for note in &outcome.notes {
                    writeln!(writer, "  {note}")?;
                }
                Ok(())
            }
        }
    }

    /// Reports a warning on the diagnostic stream.
    pub fn write_warning<W: Write>(&self, writer: &mut W, message: &str) -> io::Result<()> {
        writeln!(writer, "{} {message}", "!".yellow())
    }

    /// Reports a failed invocation.
    ///
    /// In JSON mode the error record goes to `stdout` so scripts always get a
    /// parseable document; otherwise a message goes to `stderr`.
    pub fn write_error<O: Write, E: Write>(
        &self,
        stdout: &mut O,
        stderr: &mut E,
        error: &ProxmoxError,
    ) -> io::Result<()> {
        if self.is_json() {
            let record = json!({ "error": error.to_string(), "success": false });
            serde_json::to_writer_pretty(&mut *stdout, &record)?;
            writeln!(stdout)
        } else {
            writeln!(stderr, "{} {error}", "✗".red())
        }
    }

    fn write_table<W: Write>(&self, writer: &mut W, value: &Value, title: Option<&str>) -> io::Result<()> {
        let rows = match value {
            Value::Array(items) if items.is_empty() => {
                return writeln!(writer, "{}", "No data to display".yellow());
            }
            Value::Array(items) => items.clone(),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| json!({ "key": key, "value": value }))
                .collect(),
            scalar => return writeln!(writer, "{}", cell(scalar)),
        };

        if let Some(title) = title {
            writeln!(writer, "{}", title.bold())?;
        }
        let table = Table::from_rows(&rows);
        let widths = table.widths();

        let header: Vec<String> = table
            .columns
            .iter()
            .zip(&widths)
            .map(|(name, width)| pad(&name.to_uppercase(), *width))
            .collect();
        writeln!(writer, "{}", header.join("  ").trim_end().bold())?;
        writeln!(writer, "{}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;
        for row in &table.cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(text, width)| pad(text, *width))
                .collect();
            writeln!(writer, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Format::Json, false)
    }
}

/// Result of a mutating command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip)]
    pub message: String,
    /// Extra lines shown under the message in table and plain output.
    #[serde(skip)]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            notes: Vec::new(),
            details: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.details
            .insert(key.to_string(), serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

struct Table {
    columns: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl Table {
    /// Columns are the union of keys in first-seen order.
    fn from_rows(rows: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            match row {
                Value::Object(map) => {
                    for key in map.keys() {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
                _ => {
                    if !columns.iter().any(|c| c == "value") {
                        columns.push("value".to_string());
                    }
                }
            }
        }

        let cells = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| match row {
                        Value::Object(map) => map.get(column).map(cell).unwrap_or_default(),
                        scalar if column == "value" => cell(scalar),
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect();
        Self { columns, cells }
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, name)| {
                self.cells
                    .iter()
                    .map(|row| row[index].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(fill))
}

fn write_plain<W: Write>(writer: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => {
                        let fields: Vec<String> = map.values().map(cell).collect();
                        writeln!(writer, "{}", fields.join("\t"))?;
                    }
                    other => writeln!(writer, "{}", cell(other))?,
                }
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, value) in map {
                writeln!(writer, "{key}: {}", cell(value))?;
            }
            Ok(())
        }
        scalar => writeln!(writer, "{}", cell(scalar)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: Format, value: &Value) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        RenderContext::new(format, false)
            .write(&mut buf, value, None)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let rows = json!([
            {"vmid": 100, "name": "web"},
            {"vmid": 101, "name": "database", "template": "yes"}
        ]);
        let output = render(Format::Table, &rows);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "VMID  NAME      TEMPLATE");
        assert_eq!(lines[2], "100   web");
        assert_eq!(lines[3], "101   database  yes");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render(Format::Table, &json!([])), "No data to display\n");
    }

    #[test]
    fn test_plain_output() {
        let rows = json!([{"node": "pve1", "status": "online"}]);
        assert_eq!(render(Format::Plain, &rows), "pve1\tonline\n");
    }

    #[test]
    fn test_outcome_without_color_has_no_escapes() {
        colored::control::set_override(false);
        let outcome = Outcome::success("Pool 'prod' created").note("comment: staging");
        let mut buf = Vec::new();
        RenderContext::new(Format::Table, false)
            .write_outcome(&mut buf, &outcome)
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "✓ Pool 'prod' created\n  comment: staging\n"
        );

        let mut stderr = Vec::new();
        RenderContext::new(Format::Plain, false)
            .write_error(&mut Vec::new(), &mut stderr, &ProxmoxError::Config("bad".to_string()))
            .unwrap();
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(stderr.starts_with("✗ "));
        assert!(!stderr.contains('\x1b'));
    }

    #[test]
    fn test_color_follows_config() {
        let mut tree = ConfigTree::empty();
        tree.set("output.color", "false");
        assert!(!RenderContext::resolve(None, &tree).color());
    }

    #[test]
    fn test_json_error_record() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        RenderContext::new(Format::Json, false)
            .write_error(
                &mut stdout,
                &mut stderr,
                &ProxmoxError::Authentication("denied".to_string()),
            )
            .unwrap();

        let record: Value = serde_json::from_slice(&stdout).unwrap();
        assert_eq!(record["success"], false);
        assert_eq!(record["error"], "Authentication error: denied");
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::success("Pool 'prod' created").with("poolid", "prod");
        let mut buf = Vec::new();
        RenderContext::new(Format::Json, false)
            .write_outcome(&mut buf, &outcome)
            .unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, json!({"success": true, "poolid": "prod"}));
    }

    #[test]
    fn test_format_precedence() {
        let mut tree = ConfigTree::empty();
        assert_eq!(RenderContext::resolve(None, &tree).format(), Format::Json);

        tree.set("output.format", "yaml");
        assert_eq!(RenderContext::resolve(None, &tree).format(), Format::Yaml);
        assert_eq!(
            RenderContext::resolve(Some(Format::Plain), &tree).format(),
            Format::Plain
        );
    }
}
