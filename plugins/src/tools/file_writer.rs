use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tripcrew_core::api::{
    parse_args, FieldKind, FileWriterConfig, InputSchema, Tool, ToolError, ToolSpec,
};

pub const TOOL_NAME: &str = "file_writer";

#[derive(Debug, Deserialize)]
struct WriteArgs {
    filename: String,
    content: String,
    #[serde(default)]
    directory: Option<String>,
    #[serde(default)]
    overwrite: bool,
}

/// Writes text files below a fixed base directory.
#[derive(Debug, Clone)]
pub struct FileWriterTool {
    spec: ToolSpec,
    base_dir: PathBuf,
}

impl FileWriterTool {
    pub fn new(cfg: &FileWriterConfig) -> Self {
        Self::with_base_dir(&cfg.base_dir)
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec: ToolSpec::new(
                TOOL_NAME,
                "Write content to a file in the output directory. Relative paths only.",
                InputSchema::new()
                    .required("filename", FieldKind::String, "Name of the file to write.")
                    .required("content", FieldKind::String, "Text to write into the file.")
                    .optional(
                        "directory",
                        FieldKind::String,
                        "Sub-directory below the output directory.",
                    )
                    .optional(
                        "overwrite",
                        FieldKind::Boolean,
                        "Replace the file if it already exists. Defaults to false.",
                    ),
            ),
            base_dir: base_dir.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> ToolError {
        ToolError::InvalidInput {
            tool: TOOL_NAME.to_string(),
            message: message.into(),
        }
    }

    /// Joins the relative parts onto the base directory, refusing anything that
    /// could land outside it.
    fn resolve(&self, directory: Option<&str>, filename: &str) -> Result<PathBuf, ToolError> {
        let mut path = self.base_dir.clone();
        let parts = directory
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .into_iter()
            .chain(std::iter::once(filename.trim()));

        for part in parts {
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(c) => path.push(c),
                    Component::CurDir => {}
                    Component::ParentDir => {
                        return Err(Self::invalid(format!("'..' is not allowed in '{part}'")))
                    }
                    Component::RootDir | Component::Prefix(_) => {
                        return Err(Self::invalid(format!(
                            "absolute paths are not allowed: '{part}'"
                        )))
                    }
                }
            }
        }

        if path == self.base_dir {
            return Err(Self::invalid("filename must not be empty"));
        }
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ToolError {
    ToolError::Io {
        tool: TOOL_NAME.to_string(),
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl Tool for FileWriterTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: WriteArgs = parse_args(TOOL_NAME, args)?;
        let path = self.resolve(args.directory.as_deref(), &args.filename)?;

        if !args.overwrite && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Self::invalid(format!(
                "'{}' already exists; set overwrite to true to replace it",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::info!(tool = TOOL_NAME, path = %path.display(), bytes = args.content.len(), "file written");
        Ok(format!("Content successfully written to {}", path.display()))
    }
}
