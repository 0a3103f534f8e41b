use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Parsed form of a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Final(String),
    UseTool { tool: String, args: Value },
}

fn final_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Final\s+Answer\s*:").expect("FINAL_REGEX is valid"))
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^[\s*]*Action\s*:[\s*]*(.+?)[\s*]*$").expect("ACTION_REGEX is valid")
    })
}

fn action_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Action\s*Input\s*:").expect("ACTION_INPUT_REGEX is valid")
    })
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z]*\s*\n?(.*?)```").expect("FENCE_REGEX is valid")
    })
}

/// Parses a reply into a directive.
///
/// `Err` carries a message for the model when the reply names an action but the
/// action cannot be read.
pub fn parse(reply: &str) -> Result<Directive, String> {
    let text = reply.trim();

    if let Some(directive) = parse_json_directive(text) {
        return Ok(directive);
    }

    let final_at = final_re().find(text);
    let action_at = action_re().captures(text);

    match (final_at, action_at) {
        (Some(f), Some(a)) if a.get(0).map(|m| m.start()).unwrap_or(0) > f.start() => {
            Ok(Directive::Final(clean_final(&text[f.end()..])))
        }
        (_, Some(caps)) => parse_action(text, &caps),
        (Some(f), None) => Ok(Directive::Final(clean_final(&text[f.end()..]))),
        (None, None) => Ok(Directive::Final(text.to_string())),
    }
}

fn parse_action(text: &str, caps: &regex::Captures<'_>) -> Result<Directive, String> {
    let tool = caps
        .get(1)
        .map(|m| m.as_str().trim().trim_matches('`').to_string())
        .unwrap_or_default();
    if tool.is_empty() {
        return Err("'Action:' must be followed by a tool name".to_string());
    }

    let action_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let Some(input) = action_input_re().find_at(text, action_end) else {
        return Err(format!(
            "'Action: {tool}' must be followed by 'Action Input:' with the tool arguments"
        ));
    };

    let mut raw = &text[input.end()..];
    // Drop anything the model hallucinated past its own action.
    if let Some(pos) = raw.find("\nObservation:") {
        raw = &raw[..pos];
    }
    let raw = strip_fence(raw.trim());

    let args = serde_json::from_str::<Value>(raw)
        .unwrap_or_else(|_| Value::String(raw.trim_matches('"').to_string()));
    Ok(Directive::UseTool { tool, args })
}

fn parse_json_directive(text: &str) -> Option<Directive> {
    let candidate = strip_fence(text);
    if !candidate.starts_with('{') {
        return None;
    }
    let Value::Object(mut obj) = serde_json::from_str::<Value>(candidate).ok()? else {
        return None;
    };
    let tool = obj.remove("tool")?.as_str()?.trim().to_string();
    if tool.is_empty() {
        return None;
    }
    let args = obj.remove("args").unwrap_or(Value::Null);
    Some(Directive::UseTool { tool, args })
}

fn strip_fence(text: &str) -> &str {
    match fence_re().captures(text) {
        Some(caps) if text.starts_with("```") => caps.get(1).map(|m| m.as_str().trim()).unwrap_or(text),
        _ => text,
    }
}

fn clean_final(answer: &str) -> String {
    answer.trim().to_string()
}
