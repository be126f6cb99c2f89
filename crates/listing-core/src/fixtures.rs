//! JSON catalog snapshots used to seed in-process catalogs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Category, Listing, Village};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub villages: Vec<Village>,
}

impl CatalogSnapshot {
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))
    }

    /// Merge every `*.json` file under `root`, in path order. Later files
    /// never replace an id already loaded.
    pub fn load_dir(root: &Path) -> Result<Self> {
        let mut merged = Self::default();
        for path in list_json_files(root) {
            merged.absorb(Self::load_file(&path)?);
        }
        Ok(merged)
    }

    /// A file is loaded directly; a directory is merged.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() { Self::load_dir(path) } else { Self::load_file(path) }
    }

    fn absorb(&mut self, other: Self) {
        let mut seen: HashSet<String> = self.listings.iter().map(|l| l.id.clone()).collect();
        self.listings.extend(other.listings.into_iter().filter(|l| seen.insert(l.id.clone())));
        let mut seen: HashSet<String> = self.categories.iter().map(|c| c.id.clone()).collect();
        self.categories.extend(other.categories.into_iter().filter(|c| seen.insert(c.id.clone())));
        let mut seen: HashSet<String> = self.villages.iter().map(|v| v.id.clone()).collect();
        self.villages.extend(other.villages.into_iter().filter(|v| seen.insert(v.id.clone())));
    }
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}
