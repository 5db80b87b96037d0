use crate::config::resolve::{EffectiveSettings, RunPlan};
use crate::diagram::{self, DiagramRenderer, RenderOutcome};
use crate::fingerprint::prompt_hash;
use crate::model::{MetadataRecord, ModelConfig, Prompt, RunStatus};
use crate::providers::llm::LlmClient;
use crate::providers::metadata::normalizer_for;
use crate::storage::artifacts::{
    canonical_prompt_path, ensure_directory, write_diagram_source, write_json, write_text,
    write_text_if_missing,
};
use crate::storage::{allocate, ArtifactPaths};
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

/// A configured model paired with the adapter that talks to it.
#[derive(Clone)]
pub struct ModelTarget {
    pub config: ModelConfig,
    pub client: Arc<dyn LlmClient>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub prompt_name: String,
    pub model: String,
    pub temperature: f64,
    /// 1-based repeat index within this invocation.
    pub iteration: u32,
    pub run_dir: PathBuf,
    pub status: RunStatus,
    pub latency: Option<f64>,
    /// `None` when the response held no diagram code.
    pub diagram: Option<RenderOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: Vec<RunRecord>,
}

impl RunSummary {
    pub fn count(&self, status: RunStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn any_error(&self) -> bool {
        self.count(RunStatus::Error) > 0
    }
}

/// Drives prompts x models x repeats, one run at a time.
///
/// Provider and rendering failures are recorded and the loop moves on.
/// Filesystem failures abort the whole invocation.
pub struct Runner {
    pub output_dir: PathBuf,
    /// `None` disables image rendering; `.puml` sources are still written.
    pub renderer: Option<DiagramRenderer>,
}

impl Runner {
    pub fn new(output_dir: impl Into<PathBuf>, renderer: Option<DiagramRenderer>) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
        }
    }

    pub async fn run(
        &self,
        prompts: &[Prompt],
        models: &[ModelTarget],
        plan: &RunPlan,
    ) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut prompt_matched = false;
        let mut model_matched = false;

        for prompt in prompts.iter().filter(|p| plan.matches_prompt(&p.name)) {
            prompt_matched = true;
            let hash = prompt_hash(&prompt.text);
            self.save_prompt_copy(prompt, &hash)?;

            for target in models.iter().filter(|m| plan.matches_model(&m.config.name)) {
                model_matched = true;
                let settings = plan.resolve(&target.config);

                for iteration in 1..=settings.repeat {
                    let record = self
                        .run_once(prompt, &hash, target, &settings, iteration)
                        .await?;
                    summary.records.push(record);
                }
            }
        }

        if let (Some(f), false) = (&plan.prompt_filter, prompt_matched) {
            tracing::warn!(prompt = %f, "no prompt matched the prompt filter");
        }
        if let (Some(f), false, true) = (&plan.model_filter, model_matched, prompt_matched) {
            tracing::warn!(model = %f, "no configured model matched the model filter");
        }
        Ok(summary)
    }

    fn save_prompt_copy(&self, prompt: &Prompt, hash: &str) -> anyhow::Result<()> {
        let folder = self.output_dir.join(&prompt.name);
        ensure_directory(&folder)?;
        let path = canonical_prompt_path(&self.output_dir, &prompt.name, hash);
        if write_text_if_missing(&path, &prompt.text)? {
            tracing::info!(path = %path.display(), "saved prompt copy");
        }
        Ok(())
    }

    /// Executes a single run and persists its artifacts.
    pub async fn run_once(
        &self,
        prompt: &Prompt,
        hash: &str,
        target: &ModelTarget,
        settings: &EffectiveSettings,
        iteration: u32,
    ) -> anyhow::Result<RunRecord> {
        let params = settings.parameters(&target.config);
        tracing::info!(
            prompt = %prompt.name,
            model = %params.model,
            temperature = params.temperature,
            run = iteration,
            "running prompt"
        );

        let run_dir = allocate(
            &self.output_dir,
            &prompt.name,
            &params.model,
            params.temperature,
        )
        .context("failed to allocate run directory")?;

        let result = target.client.send_prompt(&prompt.text, &params).await;

        let fields = normalizer_for(target.client.provider_kind())
            .extract_metadata(result.raw_response.as_ref());

        let paths = ArtifactPaths::new(&run_dir, &prompt.name, hash);
        write_text(&paths.response, &result.text)?;

        let diagram = match diagram::extract(&result.text) {
            Some(code) => {
                write_diagram_source(&paths.diagram_source, &code)?;
                Some(match &self.renderer {
                    Some(r) => r.render(&code, &paths.diagram_image).await,
                    None => RenderOutcome::Skipped("rendering disabled".into()),
                })
            }
            None => {
                if result.status == RunStatus::Success {
                    tracing::warn!(
                        model = %params.model,
                        "no PlantUML code found in response, skipping diagram generation"
                    );
                }
                None
            }
        };

        let record = MetadataRecord::new(prompt, hash, &params, &result, fields);
        write_json(&paths.metadata, &record)?;

        tracing::info!(dir = %run_dir.display(), status = result.status.as_str(), "saved run");

        Ok(RunRecord {
            prompt_name: prompt.name.clone(),
            model: params.model,
            temperature: params.temperature,
            iteration,
            run_dir,
            status: result.status,
            latency: result.latency,
            diagram,
        })
    }
}
