//! External `cardityc` compiler invocation and project discovery.
//!
//! The Cardity compiler is an external collaborator: it is invoked as a
//! blocking subprocess with full stdout/stderr capture, and its output
//! representation (binary `.carc` payloads plus JSON interface descriptions)
//! is consumed as-is. Nothing in this workspace re-implements compilation.

pub mod invoke;
pub mod project;

// Re-export main types
pub use invoke::{CompiledArtifact, Compiler};
pub use project::{list_car_files, module_stem, ModuleEntry, ProjectConfig};
