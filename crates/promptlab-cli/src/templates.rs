pub const SAMPLE_PROMPT_NAME: &str = "SEQUENCE_LOGIN.txt";

pub const SAMPLE_PROMPT: &str = r#"Draw a PlantUML sequence diagram of a user logging in to a web application.
Include the browser, the web server, the authentication service and the database.
Return the diagram inside a ```plantuml code block.
"#;

pub const GITIGNORE: &str = r#"# promptlab
test_runs/
.env
"#;
