use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "promptlab",
    version,
    about = "Run prompts against LLM providers and archive every response"
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LogArgs {
    /// Log filter (e.g. `info`, `debug`, `promptlab_core=trace`)
    #[arg(long, global = true, env = "PROMPTLAB_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute prompts x models x repeats and write run directories
    Run(RunArgs),
    /// Scaffold a config file and a sample prompt
    Init(InitArgs),
    /// Check a config file without calling any provider
    Validate(ValidateArgs),
    Version,
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    /// Experiment config; defaults to promptlab.yaml when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run only the prompt with this name (file stem)
    #[arg(long, alias = "prompt_name")]
    pub prompt_name: Option<String>,

    /// Run only the configured model with this name
    #[arg(long)]
    pub model: Option<String>,

    /// Override every model's temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Override every model's completion token limit
    #[arg(long, alias = "max_tokens", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Override every model's repeat count
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: Option<u32>,

    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write diagram sources but skip PNG rendering
    #[arg(long)]
    pub no_render: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct InitArgs {
    #[arg(long, default_value = "promptlab.yaml")]
    pub config: PathBuf,

    /// Skip writing a .gitignore for run output and .env
    #[arg(long)]
    pub no_gitignore: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long, default_value = "promptlab.yaml")]
    pub config: PathBuf,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}
