//! Deployable inscription documents.
//!
//! Two envelopes are written for deployment: a package manifest
//! (`deploy_package`) bundling every module, and part envelopes
//! (`deploy_part`) for payloads over the per-transaction byte limit.
//!
//! Field layout is a fixed external contract shared with indexers. The
//! `package`/`package_id` and `abi`/`package_abi` pairs are deliberate legacy
//! duplications for older consumers; both members of a pair must always be
//! written in lock-step, never mismatched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Envelope discriminator shared by every Cardity inscription.
pub const INSCRIPTION_KIND: &str = "cardity";

/// Operation tag of a whole-package deployment manifest.
pub const OP_DEPLOY_PACKAGE: &str = "deploy_package";

/// Operation tag of one part of a split payload.
pub const OP_DEPLOY_PART: &str = "deploy_part";

/// Version recorded when the project config does not declare one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Dogecoin keeps one inscription under 50 KB per transaction.
pub const DEFAULT_MAX_PART_BYTES: usize = 50_000;

/// One module inside a package manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleBundle {
    /// Canonical module name; unique within one manifest.
    pub name: String,
    /// Compiled `.carc` payload, base64-encoded.
    pub binary_base64: String,
    /// Embedded interface description; present when ABI inclusion is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<Value>,
}

/// Top-level deployable package manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    pub kind: String,
    pub operation: String,
    pub package_id: String,
    /// Legacy alias of `package_id`; always equal to it.
    pub package: String,
    pub version: String,
    pub modules: Vec<ModuleBundle>,
    /// Package-level interface map keyed by module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<BTreeMap<String, Value>>,
    /// Legacy alias of `abi`; written in lock-step with it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_abi: Option<BTreeMap<String, Value>>,
}

/// One size-bounded contiguous slice of a split payload.
///
/// Every part duplicates the full reassembly metadata, so any subset of
/// parts can be matched and ordered without external bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartEnvelope {
    pub kind: String,
    pub operation: String,
    /// Stable identity of the unsplit payload (content hash + metadata).
    pub bundle_id: String,
    /// 1-based position of this part within the bundle.
    pub idx: usize,
    /// Number of parts in the bundle.
    pub total: usize,
    pub package_id: String,
    pub version: String,
    pub module: String,
    /// This part's payload slice, base64-encoded.
    pub binary_base64_slice: String,
}
