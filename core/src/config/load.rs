use std::path::{Path, PathBuf};

use super::types::{AppConfig, SearchProvider};

/// Get the default tripcrew data directory: ~/.tripcrew
pub fn get_tripcrew_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".tripcrew"))
}

pub fn get_tripcrew_env_file_path() -> anyhow::Result<PathBuf> {
    Ok(get_tripcrew_data_dir()?.join(".env"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

/// Loads `~/.tripcrew/config.toml`, then `./config.toml`, then defaults.
///
/// Environment overrides are applied separately by [`apply_env_overrides`] so the
/// caller can merge the `.env` file into the lookup.
pub fn load_default() -> anyhow::Result<AppConfig> {
    let data_dir = get_tripcrew_data_dir()?;
    let home_config = data_dir.join("config.toml");
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    cfg.env_file = get_tripcrew_env_file_path()?.to_string_lossy().to_string();

    let dir_unset = cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    if dir_unset {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    Ok(cfg)
}

/// Applies the documented environment variables on top of file configuration.
///
/// Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("OPENAI_API_KEY") {
        cfg.llm.api_key = v;
    }
    if let Some(v) = get("TRIPCREW_LLM_BASE_URL") {
        cfg.llm.base_url = v;
    }
    if let Some(v) = get("TRIPCREW_LLM_MODEL") {
        cfg.llm.model = v;
    }
    if let Some(v) = get("SERPER_API_KEY") {
        cfg.search.serper_api_key = v;
    }
    if let Some(v) = get("TAVILY_API_KEY") {
        cfg.search.tavily_api_key = v;
    }
    if let Some(v) = get("TRIPCREW_SEARCH_PROVIDER") {
        cfg.search.provider = v
            .parse::<SearchProvider>()
            .map_err(|e| anyhow::anyhow!("TRIPCREW_SEARCH_PROVIDER: {e}"))?;
    }
    if let Some(v) = get("TRIPCREW_SCRAPE_URL") {
        cfg.scrape.url = v;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_path_reads_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[pipeline]\ntool_timeout_secs = 5\n\n[file_writer]\nbase_dir = \"plans\""
        )
        .unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.pipeline.tool_timeout_secs, 5);
        assert_eq!(cfg.pipeline.summarize_concurrency, 4);
        assert_eq!(cfg.file_writer.base_dir, "plans");
    }

    #[test]
    fn test_load_from_path_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nmodel = ").unwrap();
        let err = load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("TRIPCREW_LLM_MODEL", "   "),
            ("TRIPCREW_SEARCH_PROVIDER", "tavily"),
            ("TRIPCREW_SCRAPE_URL", "http://browserless:3000/content"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.llm.api_key, "sk-test");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.search.provider, SearchProvider::Tavily);
        assert_eq!(cfg.scrape.url, "http://browserless:3000/content");
    }

    #[test]
    fn test_env_override_rejects_unknown_provider() {
        let mut cfg = AppConfig::default();
        let err = apply_env_overrides(&mut cfg, |k| {
            (k == "TRIPCREW_SEARCH_PROVIDER").then(|| "bing".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown search provider"));
    }
}
