//! PlantUML handling: pull diagram code out of a model answer and turn it into a PNG.

pub mod extract;
pub mod render;

pub use extract::extract;
pub use render::{DiagramRenderer, HttpEndpoint, RenderEndpoint, RenderOutcome};

pub const START_MARKER: &str = "@startuml";
pub const END_MARKER: &str = "@enduml";

/// `@startuml\n<code>\n@enduml\n`
pub fn wrap_source(code: &str) -> String {
    format!("{START_MARKER}\n{code}\n{END_MARKER}\n")
}

pub fn has_markers(code: &str) -> bool {
    code.contains(START_MARKER) && code.contains(END_MARKER)
}

/// Complete PlantUML document for `code`: kept as is when it already
/// carries both markers, wrapped otherwise.
pub fn to_document(code: &str) -> String {
    let code = code.trim();
    if has_markers(code) {
        format!("{code}\n")
    } else {
        wrap_source(code)
    }
}
