//! Package assembly and payload splitting for Cardity deployments.
//!
//! Packaging never proceeds on a known-invalid link graph: the cross-module
//! validator is a hard precondition, and a manifest is written only after
//! every module compiled and assembled cleanly. Oversized payloads are split
//! into content-addressed part envelopes that reassemble without external
//! bookkeeping.

pub mod package;
pub mod split;

// Re-export main types
pub use package::{build_package, default_manifest_path, write_manifest, PackageOptions};
pub use split::{bundle_id, reassemble, split_payload, write_parts};
