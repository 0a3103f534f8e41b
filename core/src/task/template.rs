use std::sync::OnceLock;

use regex::Regex;

use crate::error::TaskError;
use crate::pipeline::Inputs;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("PLACEHOLDER_REGEX is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Text with `{name}` placeholders, parsed once.
///
/// Braces that do not wrap an identifier (`{ }`, JSON snippets) stay literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in placeholder_re().captures_iter(&source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(name.as_str().to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names in first-appearance order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Placeholder(name) = seg {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Single-pass substitution; values are never re-scanned for placeholders.
    pub fn render(&self, task_id: &str, inputs: &Inputs) -> Result<String, TaskError> {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = inputs.get(name).ok_or_else(|| TaskError::MissingPlaceholder {
                        task: task_id.to_string(),
                        name: name.clone(),
                    })?;
                    out.push_str(&value.render());
                }
            }
        }
        Ok(out)
    }
}
