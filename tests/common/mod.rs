//! Shared helpers for CLI integration tests.
//!
//! The external `cardityc` compiler is stubbed with a shell script serving
//! pre-generated fixtures, so the tests exercise the real pipeline without a
//! compiler toolchain on the machine.

use std::fs;
use std::path::{Path, PathBuf};

/// Write a stub `cardityc` that copies fixtures from `fixtures_dir`.
///
/// `--format json` serves `<stem>.json`; `--format carc` serves
/// `<stem>.carc` plus the `<stem>.abi.json` sibling, mirroring the real
/// compiler's output contract.
pub fn write_stub_compiler(bin_dir: &Path, fixtures_dir: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
src="$1"; shift
fmt=""; out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --format) fmt="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
stem=$(basename "$src" .car)
fix="{fixtures}"
case "$fmt" in
  json) cp "$fix/$stem.json" "$out" ;;
  carc)
    cp "$fix/$stem.carc" "$out" || exit 1
    cp "$fix/$stem.abi.json" "$(dirname "$out")/$stem.abi.json"
    ;;
  *) echo "unknown format: $fmt" >&2; exit 1 ;;
esac
"#,
        fixtures = fixtures_dir.display()
    );

    let path = bin_dir.join("cardityc");
    fs::write(&path, script).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }
    path
}

/// Interface JSON for a module.
///
/// Each method is `(name, params, param_types, logic)`.
pub fn interface_json(protocol: &str, methods: &[(&str, &[&str], &[&str], &str)]) -> String {
    let mut method_map = serde_json::Map::new();
    for (name, params, param_types, logic) in methods {
        method_map.insert(
            name.to_string(),
            serde_json::json!({
                "params": params,
                "param_types": param_types,
                "logic": logic,
            }),
        );
    }
    serde_json::json!({
        "protocol": protocol,
        "cpl": { "methods": method_map }
    })
    .to_string()
}
