//! Content-addressed payload splitting.
//!
//! A payload over the per-transaction byte limit is split into ordered part
//! envelopes. The bundle identity is derived from a digest of the whole
//! payload plus identifying metadata, never from run-specific state such as
//! timestamps, so re-splitting after an interruption is idempotent and two
//! machines splitting the same payload agree on everything.

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::package::write_pretty_json;
use cardity_types::encoding::{base64_decode, base64_encode};
use cardity_types::manifest::{PartEnvelope, INSCRIPTION_KIND, OP_DEPLOY_PART};

/// Hex characters of the payload digest kept in the bundle identity.
const BUNDLE_HASH_PREFIX: usize = 16;

/// Stable identity of one split bundle.
///
/// Identical payload and metadata always yield the same identity, regardless
/// of when or where the split runs.
pub fn bundle_id(payload: &[u8], package_id: &str, module: &str, version: &str) -> String {
    let digest = hex::encode(Sha256::digest(payload));
    format!(
        "{}-{}-{}-{}",
        package_id,
        module,
        version,
        &digest[..BUNDLE_HASH_PREFIX]
    )
}

/// Split one payload into ordered part envelopes.
///
/// Slices are contiguous and non-overlapping, at most `max_bytes` long, with
/// 1-based indices in payload order; the final part may be shorter. A
/// zero-length payload degenerates to zero parts.
pub fn split_payload(
    payload: &[u8],
    package_id: &str,
    module: &str,
    version: &str,
    max_bytes: usize,
) -> Result<Vec<PartEnvelope>> {
    if max_bytes == 0 {
        return Err(anyhow!("max part size must be positive"));
    }

    let total = payload.len().div_ceil(max_bytes);
    let bundle = bundle_id(payload, package_id, module, version);
    tracing::debug!(bundle = %bundle, total, bytes = payload.len(), "splitting payload");

    let mut parts = Vec::with_capacity(total);
    for (i, slice) in payload.chunks(max_bytes).enumerate() {
        parts.push(PartEnvelope {
            kind: INSCRIPTION_KIND.to_string(),
            operation: OP_DEPLOY_PART.to_string(),
            bundle_id: bundle.clone(),
            idx: i + 1,
            total,
            package_id: package_id.to_string(),
            version: version.to_string(),
            module: module.to_string(),
            binary_base64_slice: base64_encode(slice),
        });
    }
    Ok(parts)
}

/// Write each part as its own JSON file under `out_dir`.
///
/// Files are named `<payload_name>.<idx>-of-<total>.part.json`. Returns the
/// written paths in index order.
pub fn write_parts(
    out_dir: &Path,
    payload_name: &str,
    parts: &[PartEnvelope],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(parts.len());
    for part in parts {
        let path = out_dir.join(format!(
            "{}.{}-of-{}.part.json",
            payload_name, part.idx, part.total
        ));
        write_pretty_json(&path, part)?;
        written.push(path);
    }
    Ok(written)
}

/// Reassemble the original payload from part envelopes, in any input order.
///
/// All parts must share one bundle identity and agree on `total`, and the
/// indices must cover 1..=total with no gaps or duplicates.
pub fn reassemble(parts: &[PartEnvelope]) -> Result<Vec<u8>> {
    let first = parts
        .first()
        .ok_or_else(|| anyhow!("no parts to reassemble"))?;
    let total = first.total;
    if parts.len() != total {
        return Err(anyhow!(
            "bundle '{}' expects {} parts, got {}",
            first.bundle_id,
            total,
            parts.len()
        ));
    }

    let mut slices: Vec<Option<Vec<u8>>> = vec![None; total];
    for part in parts {
        if part.bundle_id != first.bundle_id {
            return Err(anyhow!(
                "mixed bundles: '{}' and '{}'",
                first.bundle_id,
                part.bundle_id
            ));
        }
        if part.total != total {
            return Err(anyhow!(
                "part {} of bundle '{}' disagrees on total ({} vs {})",
                part.idx,
                part.bundle_id,
                part.total,
                total
            ));
        }
        if part.idx == 0 || part.idx > total {
            return Err(anyhow!(
                "part index {} out of range 1..={} in bundle '{}'",
                part.idx,
                total,
                part.bundle_id
            ));
        }
        let slot = &mut slices[part.idx - 1];
        if slot.is_some() {
            return Err(anyhow!(
                "duplicate part {} in bundle '{}'",
                part.idx,
                part.bundle_id
            ));
        }
        *slot = Some(base64_decode(&part.binary_base64_slice, "part slice")?);
    }

    let mut payload = Vec::new();
    for (i, slot) in slices.into_iter().enumerate() {
        let slice =
            slot.ok_or_else(|| anyhow!("missing part {} in bundle '{}'", i + 1, first.bundle_id))?;
        payload.extend_from_slice(&slice);
    }
    Ok(payload)
}
