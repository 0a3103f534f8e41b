use std::collections::HashMap;
use std::path::Path;

use tripcrew_core::api::CliError;

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped; values may be
/// single- or double-quoted with backslash escapes.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("failed to read env file {}: {e}", path.display()))
    })?;
    parse_env_content(&content)
}

pub fn parse_env_content(content: &str) -> Result<Vec<(String, String)>, CliError> {
    let mut out = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (k, v) = line.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "invalid env line at {} (expected KEY=VALUE)",
                idx + 1
            ))
        })?;
        let key = k.trim();
        if key.is_empty() {
            return Err(CliError::Config(format!(
                "invalid env line at {} (empty key)",
                idx + 1
            )));
        }
        let value = parse_env_value(v.trim(), idx + 1)?;
        out.push((key.to_string(), value));
    }

    Ok(out)
}

fn parse_env_value(value: &str, line_no: usize) -> Result<String, CliError> {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return unescape_env_value(inner, line_no);
        }
    }
    Ok(value.to_string())
}

fn unescape_env_value(value: &str, line_no: usize) -> Result<String, CliError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            return Err(CliError::Config(format!(
                "invalid escape at line {line_no} (trailing backslash)"
            )));
        };
        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Loads the `.env` file if present; a missing file is not an error.
pub fn load_env_file(path: &str) -> Result<HashMap<String, String>, CliError> {
    let path = Path::new(path);
    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(HashMap::new());
    }
    Ok(parse_env_file(path)?.into_iter().collect())
}

/// Process environment first, then the `.env` file.
pub fn env_lookup(dotenv: &HashMap<String, String>, key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| dotenv.get(key).cloned())
}
