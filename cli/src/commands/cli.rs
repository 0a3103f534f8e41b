use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tripcrew", version, about = "Plan a trip with a crew of LLM agents")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Where the traveller starts from.
    #[arg(long)]
    pub origin: Option<String>,

    /// Candidate cities, comma-separated or repeated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub cities: Vec<String>,

    /// Travel dates, e.g. "2026-11-25 to 2026-12-08".
    #[arg(long)]
    pub date_range: Option<String>,

    /// Traveller interests, comma-separated or repeated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub interests: Vec<String>,

    /// Write the final itinerary here instead of the crew's default file.
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Bind address; defaults to `http_server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port; defaults to `http_server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Write to this path instead of `~/.tripcrew/config.toml`.
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ToolArgs {
    /// Tool name, e.g. `calculator` or `web_search`.
    pub name: String,

    /// JSON object, or plain text for single-field tools.
    pub input: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the travel crew once and print the itinerary.
    Plan(PlanArgs),
    /// Serve the planner over HTTP.
    Serve(ServeArgs),
    /// Write a default config file.
    Init(InitArgs),
    /// Run a single tool directly.
    Tool(ToolArgs),
}
