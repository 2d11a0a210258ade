use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use timestudy::report::{fields_table, metrics_table, mismatch_line};
use timestudy::{
    init_logging, render_svg, ClientSettings, ConfigField, ConfigurationModel, ProgramFile,
    Session, SubmitError, ToolpathRenderer,
};

#[derive(Debug, Parser)]
#[command(name = "timestudy", version, about = "Estimate CNC laser cycle times from G-code")]
struct Cli {
    /// Client settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis endpoint, overriding settings and TIMESTUDY_API_URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a program for analysis
    Analyze {
        /// G-code program to analyze
        file: PathBuf,

        /// Set a machine parameter, e.g. --set pierce_time=0.8
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Flip a boolean machine parameter, e.g. --toggle followProgramArcs
        #[arg(long = "toggle", value_name = "FIELD")]
        toggle: Vec<String>,

        /// Write an SVG preview of the toolpath
        #[arg(long, value_name = "OUT")]
        svg: Option<PathBuf>,

        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check that the analysis service is reachable
    Health,

    /// List machine parameters and their defaults
    Fields,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("warning: logging unavailable: {e}");
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::Fields = cli.command {
        print!("{}", fields_table(ConfigurationModel::new().values()));
        return Ok(());
    }

    let settings = ClientSettings::load(cli.config.as_deref()).context("loading client settings")?;
    let endpoint = match cli.endpoint {
        Some(endpoint) => endpoint,
        None => settings.resolve_endpoint()?,
    };
    let mut session = Session::from_settings(&settings, &endpoint)?;

    match cli.command {
        Command::Health => {
            let message = session.health().await?;
            println!("{}: {}", session.endpoint(), message);
            Ok(())
        }
        Command::Analyze {
            file,
            set,
            toggle,
            svg,
            json,
        } => {
            apply_edits(session.config_mut(), &set, &toggle)?;

            let program = ProgramFile::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            let outcome = session
                .submit(Some(&program))
                .await
                .map_err(|e| stage_error(&e))?;

            if json {
                println!("{}", serde_json::to_string_pretty(outcome.result)?);
            } else {
                print!("{}", metrics_table(outcome.result));
            }
            if let Some(line) = mismatch_line(&outcome.total) {
                eprintln!("{}", line);
            }

            if let Some(out) = svg {
                let (width, height) = (
                    f64::from(settings.canvas_width),
                    f64::from(settings.canvas_height),
                );
                let drawn = ToolpathRenderer::new(width, height).render(&outcome.result.toolpath);
                std::fs::write(&out, render_svg(&drawn, width, height))
                    .with_context(|| format!("writing {}", out.display()))?;
                tracing::info!("Wrote toolpath preview to {}", out.display());
            }

            Ok(())
        }
        Command::Fields => Ok(()),
    }
}

fn apply_edits(
    config: &mut ConfigurationModel,
    set: &[String],
    toggle: &[String],
) -> anyhow::Result<()> {
    for edit in set {
        let (name, value) = edit
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", edit))?;
        config.set_by_name(name.trim(), value)?;
    }

    for name in toggle {
        let field: ConfigField = name.trim().parse()?;
        let now = config.toggle(field)?;
        tracing::debug!("{} toggled to {}", field, now);
    }

    Ok(())
}

fn stage_error(err: &SubmitError) -> anyhow::Error {
    anyhow!("{} stage failed: {}", err.stage(), err)
}
