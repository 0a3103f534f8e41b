//! `tripcrew init`: writes a commented default configuration file.
use std::path::{Path, PathBuf};

use crate::commands::cli::InitArgs;
use tripcrew_core::api as core_api;

const CONFIG_HEADER: &str = "\
# tripcrew configuration
#
# Secrets are better kept in ~/.tripcrew/.env or the environment:
#   OPENAI_API_KEY, SERPER_API_KEY, TAVILY_API_KEY
# Environment variables override values in this file.

";

pub fn render_default_config() -> Result<String, core_api::CliError> {
    let body = toml::to_string_pretty(&core_api::AppConfig::default())
        .map_err(|e| core_api::CliError::Config(format!("failed to render config: {e}")))?;
    Ok(format!("{CONFIG_HEADER}{body}"))
}

fn target_path(args: &InitArgs) -> Result<PathBuf, core_api::CliError> {
    match args.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => Ok(PathBuf::from(shellexpand::tilde(p).into_owned())),
        None => core_api::get_tripcrew_data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| core_api::CliError::Config(format!("{e:#}"))),
    }
}

/// Returns the path written, or `None` when an existing file was left alone.
pub fn handle_init(args: InitArgs) -> Result<Option<PathBuf>, core_api::CliError> {
    let config_path = target_path(&args)?;

    if config_path.exists() && !args.force {
        println!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        println!("Re-run with --force to overwrite it.");
        return Ok(None);
    }

    write_config(&config_path)?;

    println!("Configuration written to: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. put OPENAI_API_KEY and SERPER_API_KEY in ~/.tripcrew/.env");
    println!("  2. tripcrew plan --origin Singapore --cities Tokyo,Kyoto \\");
    println!("       --date-range \"2026-11-25 to 2026-12-08\" --interests food,culture");
    Ok(Some(config_path))
}

fn write_config(path: &Path) -> Result<(), core_api::CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            core_api::CliError::Command(format!(
                "failed to create {}: {e}",
                parent.display()
            ))
        })?;
    }
    let content = render_default_config()?;
    std::fs::write(path, content).map_err(|e| {
        core_api::CliError::Command(format!("failed to write {}: {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), "default config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let rendered = render_default_config().unwrap();
        assert!(rendered.starts_with("# tripcrew configuration"));
        let cfg: core_api::AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(cfg.crew.tasks.len(), 3);
        assert_eq!(cfg.search.top_n, 4);
    }

    #[test]
    fn test_init_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let args = |force| InitArgs {
            force,
            path: Some(path.to_string_lossy().to_string()),
        };

        assert_eq!(handle_init(args(false)).unwrap(), Some(path.clone()));
        std::fs::write(&path, "# edited").unwrap();

        assert_eq!(handle_init(args(false)).unwrap(), None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited");

        assert!(handle_init(args(true)).unwrap().is_some());
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("[http_server]"));
    }
}
