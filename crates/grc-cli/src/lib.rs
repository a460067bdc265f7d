//! # grc-cli — Operator Front-End for the GRC Stack
//!
//! Provides the `grc` command-line interface over a local JSON state
//! file. Every command loads the store, runs one engine operation, and
//! writes the store back — the engine's transaction discipline means a
//! failed command leaves the state file untouched.
//!
//! ## Subcommands
//!
//! - `grc entity` — create entities and successor versions, show, list.
//! - `grc review` — submit, decide, resubmit, history, rejected inbox.
//! - `grc chain` — chain membership, activate/deactivate, scheduled
//!   activations.
//!
//! State lives under `.grc/state.json`, resolved by walking up from the
//! working directory, so the command works from anywhere inside a
//! project tree.

pub mod chain;
pub mod entity;
pub mod review;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use grc_store::{MemoryStore, Tables};

/// Path of the JSON state file under `root`.
pub fn state_file(root: &Path) -> PathBuf {
    root.join(".grc").join("state.json")
}

/// Load the store from the state file, or start empty when none exists.
pub fn load_store(root: &Path) -> Result<MemoryStore> {
    let path = state_file(root);
    let store = MemoryStore::new();
    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let tables: Tables = serde_json::from_str(&content)
            .with_context(|| format!("malformed state file {}", path.display()))?;
        store.import(tables);
    }
    Ok(store)
}

/// Write the store back to the state file, creating `.grc/` on demand.
pub fn save_store(root: &Path, store: &MemoryStore) -> Result<()> {
    let path = state_file(root);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&store.export())?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
