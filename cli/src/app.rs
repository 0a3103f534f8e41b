//! Plan command wiring: collects the trip request, builds a fresh pipeline and
//! renders the result.
use std::io::{BufRead, Write};
use std::sync::Arc;

use serde::Serialize;
use tripcrew_core::api as core_api;

use crate::commands::cli::{OutputFormat, PlanArgs};

/// Fills missing plan fields by asking on the terminal.
pub trait FieldPrompter {
    fn ask(&mut self, label: &str) -> Result<String, core_api::CliError>;
}

/// Reads answers line by line from any buffered reader, echoing labels to stderr.
pub struct LinePrompter<R> {
    reader: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> FieldPrompter for LinePrompter<R> {
    fn ask(&mut self, label: &str) -> Result<String, core_api::CliError> {
        eprint!("{label}: ");
        std::io::stderr().flush()?;
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Turns CLI flags into a validated [`core_api::TripRequest`], prompting for
/// whatever is missing when a prompter is available.
pub fn collect_request(
    args: &PlanArgs,
    mut prompter: Option<&mut dyn FieldPrompter>,
) -> Result<core_api::TripRequest, core_api::CliError> {
    let mut ask_text = |current: Option<&str>, label: &str| -> Result<String, core_api::CliError> {
        match (current.map(str::trim).filter(|s| !s.is_empty()), prompter.as_mut()) {
            (Some(v), _) => Ok(v.to_string()),
            (None, Some(p)) => p.ask(label),
            (None, None) => Ok(String::new()),
        }
    };

    let origin = ask_text(args.origin.as_deref(), "Where will you be traveling from")?;
    let cities = if args.cities.is_empty() {
        ask_text(None, "Which cities are you interested in (comma-separated)")?
    } else {
        args.cities.join(",")
    };
    let date_range = ask_text(args.date_range.as_deref(), "What is the date range you are interested in")?;
    let interests = if args.interests.is_empty() {
        ask_text(None, "What are some of your high level interests and hobbies (comma-separated)")?
    } else {
        args.interests.join(",")
    };

    let req = core_api::TripRequest::from_fields(&origin, &cities, &date_range, &interests)?;
    Ok(req)
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    success: bool,
    #[serde(flatten)]
    run: &'a core_api::PipelineRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
}

pub fn render_run(
    run: &core_api::PipelineRun,
    output_file: Option<&std::path::Path>,
    format: OutputFormat,
) -> Result<String, core_api::CliError> {
    match format {
        OutputFormat::Text => Ok(run.final_output.clone()),
        OutputFormat::Json => {
            let out = PlanOutput {
                success: true,
                run,
                output_file: output_file.map(|p| p.display().to_string()),
            };
            serde_json::to_string_pretty(&out)
                .map_err(|e| core_api::CliError::Command(format!("failed to encode run: {e}")))
        }
    }
}

#[tracing::instrument(name = "cli.plan", skip_all)]
pub async fn run_plan(
    args: PlanArgs,
    ctx: &core_api::AppContext,
) -> Result<i32, core_api::CliError> {
    let interactive = atty::is(atty::Stream::Stdin);
    let request = if interactive {
        let stdin = std::io::stdin();
        let mut prompter = LinePrompter::new(stdin.lock());
        collect_request(&args, Some(&mut prompter))?
    } else {
        collect_request(&args, None)?
    };
    tracing::debug!(?request, "trip request collected");

    let show_progress = !args.no_progress
        && args.format == OutputFormat::Text
        && atty::is(atty::Stream::Stderr);

    let mut pipeline = ctx.build_pipeline().await?;
    if let Some(output) = args.output.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        pipeline = pipeline.with_output_file(shellexpand::tilde(output).into_owned());
    }
    if show_progress {
        pipeline = pipeline.with_observer(Arc::new(core_api::ProgressObserver::new(true)));
    }

    let run = pipeline.run(&request.to_inputs()).await?;

    let rendered = render_run(&run, pipeline.output_file(), args.format)?;
    println!("{rendered}");
    if args.format == OutputFormat::Text {
        if let Some(path) = pipeline.output_file() {
            eprintln!("\nItinerary saved to {}", path.display());
        }
    }
    Ok(0)
}
