use std::fmt::Write as _;

use crate::error::ParseFailure;

pub const FRONTMATTER_DELIMITER: &str = "---";

/// A parsed SKILL.md document.
///
/// Construction goes through [`Skill::new`] or [`parse_skill`], so `name`,
/// `description` and `origin` are always non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    name: String,
    description: String,
    content: String,
    origin: String,
}

impl Skill {
    /// # Errors
    ///
    /// Returns [`ParseFailure::MissingField`] if `name`, `description` or `origin` is blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        origin: impl Into<String>,
    ) -> Result<Self, ParseFailure> {
        let name = name.into();
        let description = description.into();
        let origin = origin.into();
        if name.trim().is_empty() {
            return Err(ParseFailure::MissingField("name"));
        }
        if description.trim().is_empty() {
            return Err(ParseFailure::MissingField("description"));
        }
        if origin.trim().is_empty() {
            return Err(ParseFailure::MissingField("origin"));
        }
        Ok(Self {
            name,
            description,
            content: content.into(),
            origin,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// GitHub tree URL or absolute file path the skill was loaded from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Render the skill back into SKILL.md form.
    #[must_use]
    pub fn to_document(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{FRONTMATTER_DELIMITER}");
        let _ = writeln!(out, "name: {}", quote_if_needed(&self.name));
        let _ = writeln!(out, "description: {}", quote_if_needed(&self.description));
        let _ = writeln!(out, "{FRONTMATTER_DELIMITER}");
        if !self.content.is_empty() {
            out.push('\n');
            out.push_str(&self.content);
            out.push('\n');
        }
        out
    }
}

/// Parse a SKILL.md document with a `---`-delimited frontmatter block.
///
/// Only the `name` and `description` keys are read; the body after the closing
/// delimiter becomes the skill content, trimmed.
///
/// # Errors
///
/// Returns [`ParseFailure::NoFrontmatter`] when the text does not open with a
/// delimiter line followed later by a closing one, and
/// [`ParseFailure::MissingField`] when a required key is absent or blank.
pub fn parse_skill(raw: &str, origin: &str) -> Result<Skill, ParseFailure> {
    let (frontmatter, body) = split_frontmatter(raw).ok_or(ParseFailure::NoFrontmatter)?;

    let name = frontmatter_value(frontmatter, "name").ok_or(ParseFailure::MissingField("name"))?;
    let description = frontmatter_value(frontmatter, "description")
        .ok_or(ParseFailure::MissingField("description"))?;

    Skill::new(name, description, body.trim(), origin)
}

fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');

    let opening = lines.next()?;
    if !is_delimiter(opening) || !opening.ends_with('\n') {
        return None;
    }

    let start = opening.len();
    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            return Some((&raw[start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == FRONTMATTER_DELIMITER
}

/// First `key: value` line with a non-empty value, unquoted.
fn frontmatter_value<'a>(frontmatter: &'a str, key: &str) -> Option<&'a str> {
    frontmatter
        .lines()
        .find_map(|line| {
            let value = line.strip_prefix(key)?.strip_prefix(':')?.trim();
            (!value.is_empty()).then_some(value)
        })
        .map(unquote)
        .filter(|v| !v.trim().is_empty())
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.trim() != value
        || value.starts_with('"')
        || value.starts_with('\'')
        || value.ends_with('"')
        || value.ends_with('\'');
    if needs_quotes {
        if value.contains('"') {
            format!("'{value}'")
        } else {
            format!("\"{value}\"")
        }
    } else {
        value.to_owned()
    }
}
