use super::args::*;
use promptlab_core::config::resolve::RunPlan;
use promptlab_core::config::{self, DEFAULT_CONFIG_FILE, DEFAULT_TIMEOUT_SECONDS};
use promptlab_core::diagram::DiagramRenderer;
use promptlab_core::engine::{ModelTarget, Runner};
use promptlab_core::errors::ConfigError;
use promptlab_core::model::ExperimentConfig;
use promptlab_core::providers::llm::build_client;
use std::path::Path;
use std::time::Duration;

pub mod validate;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Validate(args) => validate::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    let root = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    write_sample_config_if_missing(&args.config)?;
    write_file_if_missing(
        &root
            .join(promptlab_core::model::DEFAULT_PROMPTS_DIR)
            .join(crate::templates::SAMPLE_PROMPT_NAME),
        crate::templates::SAMPLE_PROMPT,
    )?;
    if !args.no_gitignore {
        write_file_if_missing(&root.join(".gitignore"), crate::templates::GITIGNORE)?;
    }
    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        config::write_sample_config(path)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists", path.display());
    }
    Ok(())
}

/// Explicit `--config`, else `promptlab.yaml` in the working directory, else
/// the built-in defaults.
fn load_run_config(path: Option<&Path>) -> Result<ExperimentConfig, ConfigError> {
    if let Some(p) = path {
        return config::load_config(p, false);
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return config::load_config(default_path, false);
    }
    tracing::info!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
    Ok(ExperimentConfig::default())
}

fn build_plan(args: &RunArgs) -> Result<RunPlan, ConfigError> {
    if let Some(t) = args.temperature {
        config::validate_temperature(t)
            .map_err(|e| ConfigError(format!("--temperature: {}", e.0)))?;
    }
    Ok(RunPlan {
        prompt_filter: args.prompt_name.clone(),
        model_filter: args.model.clone(),
        temperature: args.temperature,
        max_tokens: args.max_tokens,
        repeat: args.repeat,
    })
}

/// Builds adapters only for the models that will actually run, so a missing
/// key for a filtered-out provider does not block the invocation.
fn build_targets(
    cfg: &ExperimentConfig,
    plan: &RunPlan,
    timeout: Duration,
) -> Result<Vec<ModelTarget>, ConfigError> {
    cfg.models
        .iter()
        .filter(|m| plan.matches_model(&m.name))
        .map(|m| {
            Ok(ModelTarget {
                config: m.clone(),
                client: build_client(m, timeout)?,
            })
        })
        .collect()
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let prepared = load_run_config(args.config.as_deref()).and_then(|mut cfg| {
        if let Some(dir) = &args.prompts_dir {
            cfg.prompts_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(dir) = &args.output_dir {
            cfg.output_dir = dir.to_string_lossy().into_owned();
        }
        let plan = build_plan(&args)?;
        Ok((cfg, plan))
    });
    let (cfg, plan) = match prepared {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let timeout = Duration::from_secs(cfg.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS));
    let models = match build_targets(&cfg, &plan, timeout) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let prompts = match promptlab_core::prompts::load_prompts(Path::new(&cfg.prompts_dir)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config error: {:#}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    if prompts.is_empty() {
        tracing::warn!(dir = %cfg.prompts_dir, "no .txt prompts found");
    }

    let renderer = if args.no_render {
        None
    } else {
        DiagramRenderer::from_settings(&cfg.render, timeout)?
    };

    let runner = Runner::new(&cfg.output_dir, renderer);
    let summary = runner.run(&prompts, &models, &plan).await?;
    promptlab_core::report::console::print_summary(&summary);

    if summary.any_error() {
        Ok(exit_codes::RUN_FAILED)
    } else {
        Ok(exit_codes::OK)
    }
}
