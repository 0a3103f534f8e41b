//! `tripcrew tool <name> <input>`: runs one tool outside any pipeline.
use serde_json::Value;

use crate::commands::cli::ToolArgs;
use tripcrew_core::api as core_api;

/// A JSON object is passed through; anything else is handed over as a bare string.
pub fn parse_tool_input(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(v @ Value::Object(_)) => v,
        _ => Value::String(raw.to_string()),
    }
}

pub async fn run_tool(
    args: &ToolArgs,
    services: &core_api::Services,
) -> Result<String, core_api::CliError> {
    let tool = services.tools.get(&args.name).ok_or_else(|| {
        core_api::CliError::Command(format!(
            "unknown tool '{}'; available: {}",
            args.name,
            services.tools.names().join(", ")
        ))
    })?;

    tracing::debug!(tool = %args.name, "running tool directly");
    let output = core_api::invoke(tool.as_ref(), parse_tool_input(&args.input)).await?;
    Ok(output)
}

pub async fn handle_tool(
    args: ToolArgs,
    ctx: &core_api::AppContext,
) -> Result<i32, core_api::CliError> {
    let services = ctx.build_services().await?;
    let output = run_tool(&args, &services).await?;
    println!("{output}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tripcrew_core::testing::ScriptedModel;
    use tripcrew_plugins::tools::CalculatorTool;

    fn services() -> core_api::Services {
        core_api::Services {
            model: Arc::new(ScriptedModel::new(Vec::<String>::new())),
            tools: core_api::ToolRegistry::new().with(Arc::new(CalculatorTool::new())),
        }
    }

    #[test]
    fn test_parse_tool_input() {
        assert_eq!(parse_tool_input(r#"{"expression": "1+1"}"#), json!({"expression": "1+1"}));
        assert_eq!(parse_tool_input("200*7"), json!("200*7"));
        assert_eq!(parse_tool_input("[1, 2]"), json!("[1, 2]"));
    }

    #[tokio::test]
    async fn test_run_tool_by_name() {
        let args = ToolArgs {
            name: "calculator".into(),
            input: "5000/2*10".into(),
        };
        assert_eq!(run_tool(&args, &services()).await.unwrap(), "25000");

        let unknown = ToolArgs {
            name: "weather".into(),
            input: "Kyoto".into(),
        };
        let err = run_tool(&unknown, &services()).await.unwrap_err();
        assert!(err.to_string().contains("available: calculator"));
    }
}
