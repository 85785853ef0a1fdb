//! Run records written next to generated tables and scenes.
//!
//! A record names the command and its parameters, digests every input file
//! and summarizes what the run produced (row counts, cancellation), so a
//! candidate table can be matched to the exact scene it came from.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Size and content digest of an input file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputDigest {
    pub path: String,
    pub bytes: u64,
    pub digest: String,
}

impl InputDigest {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read(path).with_context(|| format!("digesting {}", path.display()))?;
        Ok(Self {
            path: path.to_string_lossy().into_owned(),
            bytes: content.len() as u64,
            digest: digest(&content),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

/// Record of one CLI run.
#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub command: &'static str,
    pub code_rev: String,
    pub pal_version: &'static str,
    pub params: Value,
    pub inputs: Vec<InputDigest>,
    /// What the run produced, e.g. candidate and feature counts.
    pub results: Value,
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callsite: Option<Callsite>,
}

impl RunRecord {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            code_rev: current_git_rev(),
            pal_version: pal::VERSION,
            params,
            inputs: Vec::new(),
            results: Value::Null,
            outputs: Vec::new(),
            callsite: None,
        }
    }

    pub fn with_input(mut self, path: &Path) -> Result<Self> {
        self.inputs.push(InputDigest::read(path)?);
        Ok(self)
    }

    pub fn with_results(mut self, results: Value) -> Self {
        self.results = results;
        self
    }

    /// Write `<artifact stem>.provenance.json` next to `artifact`.
    #[track_caller]
    pub fn write_sidecar(mut self, artifact: &Path) -> Result<PathBuf> {
        let callsite = Location::caller();
        self.callsite = Some(Callsite {
            file: callsite.file(),
            line: callsite.line(),
        });
        self.outputs.push(artifact.to_string_lossy().into_owned());

        let path = provenance_path(artifact);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating provenance dir {}", parent.display()))?;
            }
        }
        fs::write(&path, serde_json::to_vec_pretty(&self)?).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "provenance written");
        Ok(path)
    }
}

/// Hex digest of `content`; stable within one toolchain, not a checksum.
pub fn digest(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact.file_stem().map_or_else(|| "artifact".into(), |s| s.to_string_lossy());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Commit from the build environment, the runtime environment, or `git`.
pub fn current_git_rev() -> String {
    option_env!("GIT_COMMIT")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok().filter(|s| !s.is_empty()))
        .or_else(|| {
            Command::new("git")
                .args(["rev-parse", "HEAD"])
                .output()
                .ok()
                .filter(|output| output.status.success())
                .and_then(|output| String::from_utf8(output.stdout).ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_artifact() {
        let derived = provenance_path(Path::new("/tmp/out/candidates.parquet"));
        assert_eq!(derived, Path::new("/tmp/out/candidates.provenance.json"));
    }

    #[test]
    fn digest_tracks_content() {
        assert_eq!(digest(b"scene"), digest(b"scene"));
        assert_ne!(digest(b"scene"), digest(b"scene "));
        assert_eq!(digest(b"").len(), 16);
    }

    #[test]
    fn record_carries_input_digest_and_results() {
        let dir = tempdir().unwrap();
        let scene = dir.path().join("scene.json");
        fs::write(&scene, br#"{"layers": []}"#).unwrap();
        let artifact = dir.path().join("candidates.csv");
        fs::write(&artifact, "feature_id\n").unwrap();

        let path = RunRecord::new("place", json!({"budget_ms": null}))
            .with_input(&scene)
            .unwrap()
            .with_results(json!({"candidates": 25, "canceled": false}))
            .write_sidecar(&artifact)
            .unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["command"], "place");
        assert_eq!(parsed["inputs"][0]["bytes"], 14);
        assert_eq!(parsed["inputs"][0]["digest"], digest(br#"{"layers": []}"#));
        assert_eq!(parsed["results"]["candidates"], 25);
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["pal_version"], pal::VERSION);
        assert!(parsed["callsite"]["line"].as_u64().is_some());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(RunRecord::new("place", Value::Null)
            .with_input(&dir.path().join("absent.json"))
            .is_err());
    }
}
