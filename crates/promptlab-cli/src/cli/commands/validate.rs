use promptlab_core::config::load_config;
use promptlab_core::model::ExperimentConfig;
use serde_json::json;

use super::exit_codes;
use crate::cli::args::ValidateArgs;

/// Strict load: unknown keys fail here even though `run` only warns.
pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let result = load_config(&args.config, true);

    if args.format == "json" {
        let output = match &result {
            Ok(cfg) => json!({
                "ok": true,
                "file": args.config,
                "prompts_dir": cfg.prompts_dir,
                "output_dir": cfg.output_dir,
                "models": cfg.models,
            }),
            Err(e) => json!({
                "ok": false,
                "file": args.config,
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(cfg) => print_text(cfg),
            Err(e) => eprintln!("✖ Validation failed\n\n{}", e),
        }
    }

    Ok(match result {
        Ok(_) => exit_codes::OK,
        Err(_) => exit_codes::CONFIG_ERROR,
    })
}

fn print_text(cfg: &ExperimentConfig) {
    eprintln!(
        "✔ Validation OK ({} model{})",
        cfg.models.len(),
        if cfg.models.len() != 1 { "s" } else { "" }
    );
    eprintln!("  prompts: {}", cfg.prompts_dir);
    eprintln!("  output:  {}", cfg.output_dir);
    for m in &cfg.models {
        eprintln!(
            "  - {} ({}) temp={} max_tokens={} repeat={}",
            m.name, m.provider, m.temperature, m.max_tokens, m.repeat
        );
    }
    if !cfg.render.enabled {
        eprintln!("  rendering disabled");
    }
}
