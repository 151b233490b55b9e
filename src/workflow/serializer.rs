use crate::block::{ConfigMap, ConfigValue};

/// Comment emitted for a configuration with nothing in it.
pub const EMPTY_CONFIG_COMMENT: &str = "# No configuration yet";

/// Rendering options for [`serialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Line emitted instead of an empty document. Should start with `#`.
    pub empty_comment: String,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            empty_comment: EMPTY_CONFIG_COMMENT.to_string(),
        }
    }
}

/// Renders a configuration value as YAML text with the default options.
pub fn serialize(value: &ConfigValue) -> String {
    serialize_with(value, &SerializerOptions::default())
}

/// Renders a configuration mapping as YAML text with the default options.
pub fn serialize_mapping(map: &ConfigMap) -> String {
    serialize_mapping_with(map, &SerializerOptions::default())
}

/// Renders a configuration mapping as YAML text.
pub fn serialize_mapping_with(map: &ConfigMap, options: &SerializerOptions) -> String {
    let mut writer = YamlWriter::new(options);
    if map.is_empty() {
        return writer.empty();
    }
    writer.write_mapping(map, 0);
    writer.finish()
}

/// Renders a configuration value as YAML text.
///
/// Mappings render as `key: value` lines, sequences as `- ` items, nested collections
/// one indentation level deeper. Strings are quoted only when a YAML reader would
/// otherwise see something else. An empty mapping (or null) renders as a single comment
/// line, so the output is never blank. The output always ends with a newline.
pub fn serialize_with(value: &ConfigValue, options: &SerializerOptions) -> String {
    let mut writer = YamlWriter::new(options);
    match value {
        ConfigValue::Null => return writer.empty(),
        ConfigValue::Mapping(map) if map.is_empty() => return writer.empty(),
        ConfigValue::Mapping(map) => writer.write_mapping(map, 0),
        ConfigValue::Sequence(items) if items.is_empty() => writer.line(0, "[]"),
        ConfigValue::Sequence(items) => writer.write_sequence(items, 0),
        ConfigValue::String(s) => match block_literal(s) {
            Some((header, lines)) => {
                writer.line(0, header);
                writer.write_block_lines(&lines, options.indent);
            }
            None => writer.line(0, &format_string(s)),
        },
        scalar => writer.line(0, &format_scalar(scalar)),
    }
    writer.finish()
}

struct YamlWriter<'a> {
    options: &'a SerializerOptions,
    lines: Vec<String>,
}

impl<'a> YamlWriter<'a> {
    fn new(options: &'a SerializerOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
        }
    }

    fn empty(&self) -> String {
        format!("{}\n", self.options.empty_comment)
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn line(&mut self, column: usize, text: &str) {
        self.lines.push(format!("{}{}", " ".repeat(column), text));
    }

    fn write_mapping(&mut self, map: &ConfigMap, column: usize) {
        let child = column + self.options.indent;
        for (key, value) in map {
            let key = format_string(key);
            match value {
                ConfigValue::Mapping(inner) if !inner.is_empty() => {
                    self.line(column, &format!("{}:", key));
                    self.write_mapping(inner, child);
                }
                ConfigValue::Sequence(items) if !items.is_empty() => {
                    self.line(column, &format!("{}:", key));
                    self.write_sequence(items, child);
                }
                ConfigValue::String(s) => match block_literal(s) {
                    Some((header, lines)) => {
                        self.line(column, &format!("{}: {}", key, header));
                        self.write_block_lines(&lines, child);
                    }
                    None => self.line(column, &format!("{}: {}", key, format_string(s))),
                },
                other => self.line(column, &format!("{}: {}", key, format_scalar(other))),
            }
        }
    }

    fn write_sequence(&mut self, items: &[ConfigValue], column: usize) {
        // Collections nested in an item are written two columns in, where the text after
        // `- ` starts, then their first line is folded onto the dash.
        let item_column = column + 2;
        for item in items {
            match item {
                ConfigValue::Mapping(inner) if !inner.is_empty() => {
                    let start = self.lines.len();
                    self.write_mapping(inner, item_column);
                    self.fold_onto_dash(start, column);
                }
                ConfigValue::Sequence(inner) if !inner.is_empty() => {
                    let start = self.lines.len();
                    self.write_sequence(inner, item_column);
                    self.fold_onto_dash(start, column);
                }
                ConfigValue::String(s) => match block_literal(s) {
                    Some((header, lines)) => {
                        self.line(column, &format!("- {}", header));
                        self.write_block_lines(&lines, item_column);
                    }
                    None => self.line(column, &format!("- {}", format_string(s))),
                },
                other => self.line(column, &format!("- {}", format_scalar(other))),
            }
        }
    }

    fn fold_onto_dash(&mut self, index: usize, column: usize) {
        if let Some(first) = self.lines.get_mut(index) {
            let text = first.trim_start().to_string();
            *first = format!("{}- {}", " ".repeat(column), text);
        }
    }

    fn write_block_lines(&mut self, lines: &[&str], column: usize) {
        for text in lines {
            if text.is_empty() {
                self.lines.push(String::new());
            } else {
                self.line(column, text);
            }
        }
    }
}

/// Splits a multi-line string into a literal block header (`|` or `|-`) and its lines,
/// or returns `None` when the string cannot be written as a literal block unchanged.
fn block_literal(s: &str) -> Option<(&'static str, Vec<&str>)> {
    if !s.contains('\n') || s.chars().any(|c| c != '\n' && is_unprintable(c)) {
        return None;
    }
    let (header, body) = match s.strip_suffix('\n') {
        Some(body) if body.ends_with('\n') => return None,
        Some(body) => ("|", body),
        None => ("|-", s),
    };
    let lines: Vec<&str> = body.split('\n').collect();
    let first_content = lines.iter().find(|line| !line.is_empty())?;
    if first_content.starts_with(' ') {
        return None;
    }
    if lines
        .iter()
        .any(|line| !line.is_empty() && line.trim().is_empty())
    {
        return None;
    }
    Some((header, lines))
}

fn format_scalar(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => format_string(s),
        ConfigValue::Mapping(_) => "{}".to_string(),
        ConfigValue::Sequence(_) => "[]".to_string(),
        other => other.to_string(),
    }
}

/// Writes a string plain when a YAML reader would read it back as the same string,
/// double-quoted otherwise.
fn format_string(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.chars().any(is_unprintable) {
        return true;
    }
    // Anything the reader would turn into a number, bool, null, collection, alias, tag or
    // comment, or would reject outright.
    !matches!(
        serde_yaml::from_str::<serde_yaml::Value>(s),
        Ok(serde_yaml::Value::String(parsed)) if parsed == s
    )
}

/// Characters that must be escaped: control characters, plus the Unicode line and
/// paragraph separators and the byte order mark, which YAML readers treat specially.
fn is_unprintable(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if is_unprintable(c) => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
