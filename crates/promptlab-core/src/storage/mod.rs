//! On-disk layout of experiment runs.
//!
//! ```text
//! <output_dir>/<prompt>/<prompt>_<hash>.txt
//! <output_dir>/<prompt>/<model>/temp_<T>/run_<NN>/<prompt>_<hash>_{RESPONSE.txt,PUML.puml,DIAGRAM.png,METADATA.json}
//! ```

pub mod artifacts;
pub mod run_dir;

pub use artifacts::ArtifactPaths;
pub use run_dir::allocate;
