//! Shared types for the cardity-deploy workspace.
//!
//! This crate holds the wire documents exchanged with the outside world
//! (package manifests, part envelopes, the compiler's module interface
//! description) and the encoding helpers used across workspace crates.

pub mod encoding;
pub mod interface;
pub mod manifest;

// Re-export main types
pub use interface::{MethodDef, ModuleInterface};
pub use manifest::{ModuleBundle, PackageManifest, PartEnvelope};
