use regex::Regex;
use std::sync::OnceLock;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*(?:plantuml|puml)[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
            .expect("fenced plantuml pattern")
    })
}

fn bare_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)@startuml[^\n]*\n(.*?)@enduml").expect("bare plantuml pattern")
    })
}

/// Finds PlantUML code in a model answer.
///
/// A fenced ```` ```plantuml ```` block wins; otherwise the body of the first
/// bare `@startuml ... @enduml` pair is used. Returns the trimmed code, or
/// `None` when there is nothing (or only whitespace) to render.
pub fn extract(text: &str) -> Option<String> {
    let captured = fenced_block()
        .captures(text)
        .or_else(|| bare_block().captures(text))?;
    let code = captured.get(1)?.as_str().trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}
