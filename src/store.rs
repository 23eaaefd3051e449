// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! On-disk persistence of strophes.
//!
//! One YAML snapshot per strophe number, `strophe-<n>.yaml`, in a
//! single directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::strophe::{StropheEditor, StropheSnapshot};

/// Directory of strophe snapshots
#[derive(Debug, Clone)]
pub struct StropheStore {
    dir: PathBuf,
}

impl StropheStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding strophe `number`
    pub fn path_for(&self, number: usize) -> PathBuf {
        self.dir.join(format!("strophe-{}.yaml", number))
    }

    /// Load a snapshot; `Ok(None)` if none was saved yet
    pub fn load(&self, number: usize) -> Result<Option<StropheSnapshot>> {
        let path = self.path_for(number);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read strophe file: {:?}", path))?;
        let snapshot = StropheSnapshot::from_yaml(&contents)
            .with_context(|| format!("Invalid strophe file: {:?}", path))?;
        Ok(Some(snapshot))
    }

    /// Load an editor, starting empty when nothing was saved
    pub fn load_editor(&self, number: usize) -> Result<StropheEditor> {
        match self.load(number)? {
            Some(snapshot) => Ok(StropheEditor::restore(snapshot)?),
            None => Ok(StropheEditor::new()),
        }
    }

    /// Save a snapshot, replacing any previous one
    pub fn save(&self, number: usize, snapshot: &StropheSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create store directory: {:?}", self.dir))?;
        let path = self.path_for(number);
        let yaml = snapshot.to_yaml()?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write strophe file: {:?}", path))?;
        tracing::debug!(path = ?path, lines = snapshot.lines.len(), "Strophe saved");
        Ok(())
    }

    /// Strophe numbers with a saved snapshot, ascending
    pub fn list(&self) -> Result<Vec<usize>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut numbers: Vec<usize> = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list store directory: {:?}", self.dir))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                name.strip_prefix("strophe-")?
                    .strip_suffix(".yaml")?
                    .parse()
                    .ok()
            })
            .collect();
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Every saved strophe, ascending by number
    pub fn load_all(&self) -> Result<Vec<(usize, StropheSnapshot)>> {
        let mut strophes = Vec::new();
        for number in self.list()? {
            if let Some(snapshot) = self.load(number)? {
                strophes.push((number, snapshot));
            }
        }
        Ok(strophes)
    }
}
