//! Alert email template
//!
//! Subject and body patterns use `{date}` and `{down_websites}` placeholders
//! with `{{` / `}}` for literal braces. Patterns are parsed once when the
//! template is loaded, so rendering during a cycle cannot fail.

use serde::Deserialize;
use thiserror::Error;

pub const DATE: &str = "date";
pub const DOWN_WEBSITES: &str = "down_websites";

const SUBJECT_PLACEHOLDERS: &[&str] = &[DATE];
const BODY_PLACEHOLDERS: &[&str] = &[DATE, DOWN_WEBSITES];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{name}}} in {field}")]
    UnknownPlaceholder { field: &'static str, name: String },

    #[error("unbalanced '{brace}' at offset {offset} in {field}")]
    UnbalancedBrace {
        field: &'static str,
        brace: char,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(
        field: &'static str,
        raw: &str,
        allowed: &[&'static str],
    ) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace {
                            field,
                            brace: '{',
                            offset,
                        });
                    }
                    let placeholder = allowed
                        .iter()
                        .copied()
                        .find(|known| *known == name)
                        .ok_or(TemplateError::UnknownPlaceholder { field, name })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' => {
                    return Err(TemplateError::UnbalancedBrace {
                        field,
                        brace: '}',
                        offset,
                    })
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some((_, value)) = values.iter().find(|(key, _)| key == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    subject: String,
    body: String,
}

/// Subject/body patterns for the consolidated alert email.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTemplate")]
pub struct EmailTemplate {
    subject: Pattern,
    body: Pattern,
}

impl TryFrom<RawTemplate> for EmailTemplate {
    type Error = TemplateError;

    fn try_from(raw: RawTemplate) -> Result<Self, Self::Error> {
        Self::new(&raw.subject, &raw.body)
    }
}

impl EmailTemplate {
    pub fn new(subject: &str, body: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            subject: Pattern::parse("subject", subject, SUBJECT_PLACEHOLDERS)?,
            body: Pattern::parse("body", body, BODY_PLACEHOLDERS)?,
        })
    }

    pub fn subject_pattern(&self) -> &str {
        &self.subject.raw
    }

    pub fn body_pattern(&self) -> &str {
        &self.body.raw
    }

    pub fn render_subject(&self, date: &str) -> String {
        self.subject.render(&[(DATE, date)])
    }

    pub fn render_body(&self, date: &str, down_websites: &str) -> String {
        self.body
            .render(&[(DATE, date), (DOWN_WEBSITES, down_websites)])
    }
}
