use async_trait::async_trait;
use promptlab_core::config::resolve::RunPlan;
use promptlab_core::diagram::{DiagramRenderer, RenderEndpoint, RenderOutcome};
use promptlab_core::engine::{ModelTarget, Runner};
use promptlab_core::fingerprint::prompt_hash;
use promptlab_core::model::{ModelConfig, Prompt, ProviderKind, RunStatus};
use promptlab_core::prompts::load_prompts;
use promptlab_core::providers::llm::fake::FakeClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn echo_model(name: &str, repeat: u32) -> ModelConfig {
    ModelConfig {
        name: name.into(),
        provider: ProviderKind::Fake,
        temperature: 0.3,
        max_tokens: 1000,
        repeat,
        base_url: None,
        api_key_env: None,
        response_text: None,
    }
}

fn target(name: &str, client: FakeClient) -> ModelTarget {
    ModelTarget {
        config: echo_model(name, 1),
        client: Arc::new(client),
    }
}

fn greeting_workspace(root: &Path) -> Vec<Prompt> {
    let prompts_dir = root.join("prompts");
    std::fs::create_dir_all(&prompts_dir).unwrap();
    std::fs::write(prompts_dir.join("GREETING.txt"), "Say hi\n").unwrap();
    load_prompts(&prompts_dir).unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_greeting_end_to_end() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let runner = Runner::new(&out, None);
    let models = [target("echo", FakeClient::new("hello"))];

    let summary = runner.run(&prompts, &models, &RunPlan::default()).await?;
    assert_eq!(summary.records.len(), 1);
    assert!(!summary.any_error());

    let hash = prompt_hash("Say hi");
    let run_dir = out.join("GREETING/echo/temp_0_3/run_01");
    assert_eq!(summary.records[0].run_dir, run_dir);
    assert_eq!(summary.records[0].diagram, None);

    let response = run_dir.join(format!("GREETING_{hash}_RESPONSE.txt"));
    assert_eq!(std::fs::read_to_string(response)?, "hello");
    assert!(!run_dir.join(format!("GREETING_{hash}_PUML.puml")).exists());
    assert!(!run_dir.join(format!("GREETING_{hash}_DIAGRAM.png")).exists());

    let meta = read_json(&run_dir.join(format!("GREETING_{hash}_METADATA.json")));
    assert_eq!(meta["status"], "success");
    assert_eq!(meta["prompt_name"], "GREETING");
    assert_eq!(meta["model"], "echo");
    assert_eq!(meta["temperature"], 0.3);
    assert_eq!(meta["prompt_hash"], hash.as_str());
    assert_eq!(meta["model_version"], "N/A");
    assert_eq!(meta["completion_id"], "N/A");
    assert_eq!(meta["total_tokens"], 0);
    assert!(meta["latency"].is_number());

    let canonical = out.join(format!("GREETING/GREETING_{hash}.txt"));
    assert_eq!(std::fs::read_to_string(canonical)?, "Say hi");
    Ok(())
}

#[tokio::test]
async fn test_second_invocation_gets_next_run_and_keeps_prompt_copy() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let runner = Runner::new(&out, None);
    let models = [target("echo", FakeClient::new("hello"))];

    runner.run(&prompts, &models, &RunPlan::default()).await?;

    let canonical = out.join(format!("GREETING/GREETING_{}.txt", prompt_hash("Say hi")));
    // Marker content proves the second run does not rewrite the copy.
    std::fs::write(&canonical, "untouched")?;

    let second = runner.run(&prompts, &models, &RunPlan::default()).await?;
    assert!(second.records[0].run_dir.ends_with("temp_0_3/run_02"));
    assert!(out.join("GREETING/echo/temp_0_3/run_01").is_dir());
    assert_eq!(std::fs::read_to_string(&canonical)?, "untouched");
    Ok(())
}

#[tokio::test]
async fn test_repeats_and_overrides() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let fake = Arc::new(FakeClient::new("hello"));
    let models = [ModelTarget {
        config: echo_model("echo", 3),
        client: fake.clone(),
    }];

    let plan = RunPlan {
        temperature: Some(1.0),
        max_tokens: Some(42),
        ..Default::default()
    };
    let summary = Runner::new(&out, None).run(&prompts, &models, &plan).await?;

    let dirs: Vec<PathBuf> = summary.records.iter().map(|r| r.run_dir.clone()).collect();
    assert_eq!(dirs.len(), 3);
    assert!(dirs[0].ends_with("echo/temp_1_0/run_01"));
    assert!(dirs[2].ends_with("echo/temp_1_0/run_03"));
    assert_eq!(
        summary.records.iter().map(|r| r.iteration).collect::<Vec<_>>(),
        [1, 2, 3]
    );

    let calls = fake.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].0, "Say hi");
    assert_eq!(calls[0].1.max_tokens, 42);
    assert_eq!(calls[0].1.temperature, 1.0);
    Ok(())
}

#[tokio::test]
async fn test_provider_error_is_recorded_and_loop_continues() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let models = [
        target("broken", FakeClient::failing("quota exceeded")),
        target("echo", FakeClient::new("hello")),
    ];

    let summary = Runner::new(&out, None)
        .run(&prompts, &models, &RunPlan::default())
        .await?;
    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records[0].status, RunStatus::Error);
    assert_eq!(summary.records[1].status, RunStatus::Success);

    let hash = prompt_hash("Say hi");
    let broken = out.join("GREETING/broken/temp_0_3/run_01");
    assert_eq!(
        std::fs::read_to_string(broken.join(format!("GREETING_{hash}_RESPONSE.txt")))?,
        "ERROR: quota exceeded"
    );
    let meta = read_json(&broken.join(format!("GREETING_{hash}_METADATA.json")));
    assert_eq!(meta["status"], "error");
    assert!(meta["latency"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_filters_select_prompt_and_model() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = vec![
        Prompt {
            name: "A".into(),
            text: "first".into(),
        },
        Prompt {
            name: "B".into(),
            text: "second".into(),
        },
    ];
    let out = tmp.path().join("test_runs");
    let models = [
        target("m1", FakeClient::new("x")),
        target("m2", FakeClient::new("y")),
    ];
    let plan = RunPlan {
        prompt_filter: Some("B".into()),
        model_filter: Some("m2".into()),
        ..Default::default()
    };

    let summary = Runner::new(&out, None).run(&prompts, &models, &plan).await?;
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].prompt_name, "B");
    assert_eq!(summary.records[0].model, "m2");
    assert!(!out.join("A").exists());

    let none = RunPlan {
        model_filter: Some("missing".into()),
        ..Default::default()
    };
    let empty = Runner::new(&out, None).run(&prompts, &models, &none).await?;
    assert!(empty.records.is_empty());
    Ok(())
}

struct PngWriter;

#[async_trait]
impl RenderEndpoint for PngWriter {
    async fn render_file(&self, source: &Path) -> anyhow::Result<()> {
        std::fs::write(source.with_extension("png"), b"\x89PNG")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "png-writer"
    }
}

struct Down;

#[async_trait]
impl RenderEndpoint for Down {
    async fn render_file(&self, _source: &Path) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    fn name(&self) -> &str {
        "down"
    }
}

const DIAGRAM_ANSWER: &str = "Here is the diagram:\n```plantuml\nAlice -> Bob: hi\n```\n";

#[tokio::test]
async fn test_diagram_artifacts_written_and_rendered() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let renderer = DiagramRenderer::new(Arc::new(Down), Some(Arc::new(PngWriter) as Arc<dyn RenderEndpoint>));
    let models = [target("echo", FakeClient::new(DIAGRAM_ANSWER))];

    let summary = Runner::new(&out, Some(renderer))
        .run(&prompts, &models, &RunPlan::default())
        .await?;

    let hash = prompt_hash("Say hi");
    let run_dir = out.join("GREETING/echo/temp_0_3/run_01");
    let puml = run_dir.join(format!("GREETING_{hash}_PUML.puml"));
    let png = run_dir.join(format!("GREETING_{hash}_DIAGRAM.png"));
    assert_eq!(
        std::fs::read_to_string(puml)?,
        "@startuml\nAlice -> Bob: hi\n@enduml"
    );
    assert_eq!(std::fs::read(&png)?, b"\x89PNG");
    assert_eq!(summary.records[0].diagram, Some(RenderOutcome::Rendered(png)));
    Ok(())
}

#[tokio::test]
async fn test_render_failure_keeps_source_and_run() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let prompts = greeting_workspace(tmp.path());
    let out = tmp.path().join("test_runs");
    let renderer = DiagramRenderer::new(Arc::new(Down), Some(Arc::new(Down) as Arc<dyn RenderEndpoint>));
    let models = [target("echo", FakeClient::new(DIAGRAM_ANSWER))];

    let summary = Runner::new(&out, Some(renderer))
        .run(&prompts, &models, &RunPlan::default())
        .await?;

    let rec = &summary.records[0];
    assert_eq!(rec.status, RunStatus::Success);
    assert!(matches!(rec.diagram, Some(RenderOutcome::Skipped(_))));

    let hash = prompt_hash("Say hi");
    assert!(rec.run_dir.join(format!("GREETING_{hash}_PUML.puml")).exists());
    assert!(!rec.run_dir.join(format!("GREETING_{hash}_DIAGRAM.png")).exists());
    assert!(rec.run_dir.join(format!("GREETING_{hash}_METADATA.json")).exists());
    Ok(())
}
