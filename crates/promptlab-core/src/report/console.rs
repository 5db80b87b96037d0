use crate::diagram::RenderOutcome;
use crate::engine::{RunRecord, RunSummary};
use crate::model::RunStatus;

fn diagram_label(r: &RunRecord) -> String {
    match &r.diagram {
        None => "no diagram".into(),
        Some(RenderOutcome::Rendered(_)) => "diagram rendered".into(),
        Some(RenderOutcome::Skipped(reason)) => format!("diagram source only ({})", reason),
    }
}

/// One line per run, for the console summary.
pub fn format_record(r: &RunRecord) -> String {
    let latency = r
        .latency
        .map(|l| format!("({:.1}s)", l))
        .unwrap_or_default();
    let icon = match r.status {
        RunStatus::Success => "✅",
        RunStatus::Error => "💥",
    };
    format!(
        "{} {} | {} | temp={} | run={}  {}  {}\n    → {}",
        icon,
        r.prompt_name,
        r.model,
        r.temperature,
        r.iteration,
        diagram_label(r),
        latency,
        r.run_dir.display()
    )
}

pub fn print_summary(summary: &RunSummary) {
    if summary.records.is_empty() {
        eprintln!("\nNo runs executed (check --prompt-name / --model filters).");
        return;
    }

    eprintln!("\nCompleted {} runs:", summary.records.len());
    for r in &summary.records {
        eprintln!("{}", format_record(r));
    }

    let rendered = summary
        .records
        .iter()
        .filter(|r| r.diagram.as_ref().is_some_and(RenderOutcome::is_rendered))
        .count();

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} succeeded, {} error, {} diagrams rendered",
        summary.count(RunStatus::Success),
        summary.count(RunStatus::Error),
        rendered
    );
}
