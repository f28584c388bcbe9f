//! Cross-module call validation for Cardity packages.
//!
//! Linking runs as a two-phase pipeline, like a whole-program linker rather
//! than a per-file resolver: every discovered module is compiled to its
//! interface description first (the registry barrier), then each module's
//! method bodies are scanned for cross-module calls and checked against the
//! registry. Forward references across modules therefore resolve regardless
//! of discovery order.
//!
//! Violations are collected exhaustively, never reported one at a time, so a
//! developer can fix a whole batch before re-running.

pub mod alias;
pub mod callsite;
pub mod infer;
pub mod registry;
pub mod validate;

// Re-export main types
pub use alias::AliasTable;
pub use callsite::{extract_call_sites, CallSite};
pub use infer::{infer_arg_type, normalize_type, ArgType};
pub use registry::{build_link_unit, LinkUnit, LoadedModule, MethodSig, ModuleRegistry};
pub use validate::{validate_unit, LinkError, LinkErrorKind, LinkFailure, NoModulesFound};
