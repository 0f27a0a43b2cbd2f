use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub merge: MergeSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Overlap precedence: "prefer-proposed" or "prefer-mainline".
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub allow_deletions: bool,
    /// Head keywords extracted as mergeable blocks.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            allow_deletions: false,
            keywords: default_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Paths matching any of these globs get the structural merge.
    #[serde(default = "default_schematic_globs")]
    pub schematic_globs: Vec<String>,
    /// Basenames merged as flat record caches.
    #[serde(default = "default_cache_names")]
    pub cache_names: Vec<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            schematic_globs: default_schematic_globs(),
            cache_names: default_cache_names(),
        }
    }
}

fn default_mode() -> String {
    "prefer-proposed".into()
}
fn default_keywords() -> Vec<String> {
    schemerge_engine::SCHEMATIC_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}
fn default_schematic_globs() -> Vec<String> {
    vec!["*.kicad_sch".into()]
}
fn default_cache_names() -> Vec<String> {
    vec!["fp-info-cache".into(), "fp-info-cache.txt".into()]
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
