//! Logical design: components and nets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub uuid: Uuid,
    pub refdes: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub mpn: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Excluded from assembly.
    #[serde(default)]
    pub nopopulate: bool,
    /// Pad name to net.
    #[serde(default)]
    pub connections: BTreeMap<String, Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub uuid: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockFile {
    uuid: Uuid,
    name: String,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    nets: Vec<Net>,
}

/// Top-level block of a project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub uuid: Uuid,
    pub name: String,
    pub components: BTreeMap<Uuid, Component>,
    pub nets: BTreeMap<Uuid, Net>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read block file {}", path.display()))?;
        let file: BlockFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse block file {}", path.display()))?;
        Ok(Self {
            uuid: file.uuid,
            name: file.name,
            components: file.components.into_iter().map(|c| (c.uuid, c)).collect(),
            nets: file.nets.into_iter().map(|n| (n.uuid, n)).collect(),
        })
    }

    pub fn net_name(&self, uuid: Uuid) -> Option<&str> {
        self.nets.get(&uuid).map(|n| n.name.as_str())
    }
}
