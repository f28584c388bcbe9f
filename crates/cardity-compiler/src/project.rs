//! Project discovery and configuration.
//!
//! A Cardity project is a directory of `.car` sources with an optional
//! `cardity.json` config declaring the package identity, version and an
//! explicit module list.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use cardity_types::manifest::DEFAULT_VERSION;

/// File name of the optional project configuration.
pub const PROJECT_CONFIG_FILE: &str = "cardity.json";

/// Optional project configuration (`cardity.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Package identity; defaults to the project directory name.
    #[serde(default)]
    pub name: Option<String>,
    /// Package version; defaults to "1.0.0".
    #[serde(default)]
    pub version: Option<String>,
    /// Explicit ordered module list; when absent the project tree is walked.
    #[serde(default)]
    pub modules: Option<Vec<ModuleEntry>>,
}

/// One entry of the explicit module list.
///
/// Accepted forms: a bare path string, or an object with a `path` (or legacy
/// `file`) key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleEntry {
    Path(String),
    Detailed {
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        file: Option<String>,
    },
}

impl ModuleEntry {
    fn rel_path(&self) -> Option<&str> {
        match self {
            ModuleEntry::Path(p) => Some(p),
            ModuleEntry::Detailed { path, file } => path.as_deref().or(file.as_deref()),
        }
    }
}

impl ProjectConfig {
    /// Load the project config, or defaults when the file is absent.
    ///
    /// An unreadable config is treated as missing, matching the original
    /// tooling's behavior.
    pub fn load(project_dir: &Path) -> Self {
        let path = project_dir.join(PROJECT_CONFIG_FILE);
        let Ok(text) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(config = %path.display(), error = %e, "ignoring unreadable project config");
                Self::default()
            }
        }
    }

    /// Package identity, defaulting to the project directory's base name.
    pub fn package_id(&self, project_dir: &Path) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                project_dir
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("package")
                    .to_string()
            })
    }

    /// Package version, defaulting to [`DEFAULT_VERSION`].
    pub fn package_version(&self) -> String {
        self.version
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }
}

/// Discover the project's module sources.
///
/// Honors the config's explicit module list when present; otherwise walks
/// the project tree for `*.car`, skipping `build`, `dist`, `node_modules`
/// and hidden directories. Walk results are sorted for deterministic
/// ordering.
pub fn list_car_files(project_dir: &Path, config: &ProjectConfig) -> Result<Vec<PathBuf>> {
    if let Some(entries) = &config.modules {
        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let rel = entry.rel_path().ok_or_else(|| {
                anyhow!("Module entry without a path in {}", PROJECT_CONFIG_FILE)
            })?;
            files.push(project_dir.join(rel));
        }
        return Ok(files);
    }

    let mut files = Vec::new();
    walk(project_dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if name == "build" || name == "dist" || name == "node_modules" || name.starts_with('.')
            {
                continue;
            }
            walk(&path, files)?;
        } else if path.extension().map(|e| e == "car").unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(())
}

/// A source file's stem, used as the module-name fallback and for naming
/// compiler outputs.
pub fn module_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid source file name: {}", path.display()))
}
