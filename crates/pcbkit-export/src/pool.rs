//! Part pool access.
//!
//! A pool is a directory holding a `pool.json` index of padstacks and
//! packages. Pools are located through a [`PoolRegistry`] that the caller
//! builds and hands to whoever needs it.

use anyhow::{anyhow, Context, Result};
use pcbkit_core::Coordi;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// File name of the pool index inside a pool directory.
pub const POOL_INDEX_FILE: &str = "pool.json";

/// Pad or via stack: a round copper pad with an optional hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Padstack {
    pub uuid: Uuid,
    pub name: String,
    /// Copper diameter in nm.
    pub pad_diameter: u64,
    /// Drill diameter in nm, zero for SMD pads.
    #[serde(default)]
    pub hole_diameter: u64,
    #[serde(default = "default_plated")]
    pub plated: bool,
}

fn default_plated() -> bool {
    true
}

impl Padstack {
    pub fn has_hole(&self) -> bool {
        self.hole_diameter > 0
    }

    /// Through-hole pads reach both copper layers.
    pub fn is_through(&self) -> bool {
        self.has_hole() && self.plated
    }
}

/// A pad of a package footprint, relative to the package origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadDef {
    pub name: String,
    pub position: Coordi,
    pub padstack: Uuid,
}

/// A package (footprint) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDef {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub pads: Vec<PadDef>,
    /// Silkscreen outline relative to the package origin.
    #[serde(default)]
    pub outline: Vec<Coordi>,
    /// 3-D model path relative to the pool base.
    #[serde(default)]
    pub model: Option<String>,
    /// Body height in nm.
    #[serde(default)]
    pub height: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PoolIndex {
    #[serde(default)]
    padstacks: Vec<Padstack>,
    #[serde(default)]
    packages: Vec<PackageDef>,
}

/// A loaded pool.
#[derive(Debug, Clone)]
pub struct Pool {
    base_path: PathBuf,
    cache_directory: PathBuf,
    padstacks: BTreeMap<Uuid, Padstack>,
    packages: BTreeMap<Uuid, PackageDef>,
}

impl Pool {
    /// Opens the pool at `base_path`.
    pub fn open(base_path: impl Into<PathBuf>, cache_directory: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        let index_path = base_path.join(POOL_INDEX_FILE);
        let content = std::fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read pool index {}", index_path.display()))?;
        let index: PoolIndex = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pool index {}", index_path.display()))?;

        let pool = Self {
            base_path,
            cache_directory: cache_directory.into(),
            padstacks: index.padstacks.into_iter().map(|p| (p.uuid, p)).collect(),
            packages: index.packages.into_iter().map(|p| (p.uuid, p)).collect(),
        };
        info!(
            "Opened pool {} ({} padstacks, {} packages)",
            pool.base_path.display(),
            pool.padstacks.len(),
            pool.packages.len()
        );
        Ok(pool)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn padstack(&self, uuid: Uuid) -> Option<&Padstack> {
        self.padstacks.get(&uuid)
    }

    pub fn package(&self, uuid: Uuid) -> Option<&PackageDef> {
        self.packages.get(&uuid)
    }

    /// Absolute path of a package's 3-D model, if it has one.
    pub fn model_path(&self, package: &PackageDef) -> Option<PathBuf> {
        package.model.as_ref().map(|m| self.base_path.join(m))
    }
}

/// Maps pool UUIDs to their base directories.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: HashMap<Uuid, PathBuf>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, uuid: Uuid, base_path: impl Into<PathBuf>) {
        let base_path = base_path.into();
        debug!("Registered pool {} at {}", uuid, base_path.display());
        self.pools.insert(uuid, base_path);
    }

    pub fn base_path(&self, uuid: Uuid) -> Option<&Path> {
        self.pools.get(&uuid).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Opens the pool registered under `uuid`.
    pub fn open(&self, uuid: Uuid, cache_directory: impl Into<PathBuf>) -> Result<Pool> {
        let base = self
            .base_path(uuid)
            .ok_or_else(|| anyhow!("Pool {} is not registered", uuid))?;
        Pool::open(base, cache_directory)
    }
}

/// Via padstacks of a project: the project's vias directory first, then the pool.
#[derive(Debug, Clone)]
pub struct ViaPadstackProvider {
    directory: PathBuf,
    padstacks: BTreeMap<Uuid, Padstack>,
}

impl ViaPadstackProvider {
    /// Loads every `*.json` padstack in `directory`. A missing directory is
    /// treated as empty.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        let mut padstacks = BTreeMap::new();
        if directory.is_dir() {
            let entries = std::fs::read_dir(&directory)
                .with_context(|| format!("Failed to list vias directory {}", directory.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read padstack {}", path.display()))?;
                let padstack: Padstack = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse padstack {}", path.display()))?;
                padstacks.insert(padstack.uuid, padstack);
            }
        }
        debug!(
            "Loaded {} via padstacks from {}",
            padstacks.len(),
            directory.display()
        );
        Ok(Self {
            directory,
            padstacks,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.padstacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.padstacks.is_empty()
    }

    /// Looks up a via padstack, falling back to `pool`.
    pub fn get<'a>(&'a self, uuid: Uuid, pool: &'a Pool) -> Option<&'a Padstack> {
        self.padstacks.get(&uuid).or_else(|| pool.padstack(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pool(dir: &Path, padstack: &Padstack) {
        let index = PoolIndex {
            padstacks: vec![padstack.clone()],
            packages: vec![],
        };
        std::fs::write(
            dir.join(POOL_INDEX_FILE),
            serde_json::to_string(&index).unwrap(),
        )
        .unwrap();
    }

    fn via_padstack(name: &str) -> Padstack {
        Padstack {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            pad_diameter: 600_000,
            hole_diameter: 300_000,
            plated: true,
        }
    }

    #[test]
    fn test_registry_opens_registered_pool() {
        let dir = TempDir::new().unwrap();
        let ps = via_padstack("pool via");
        write_pool(dir.path(), &ps);

        let pool_uuid = Uuid::new_v4();
        let mut registry = PoolRegistry::new();
        registry.register(pool_uuid, dir.path());
        let pool = registry.open(pool_uuid, dir.path().join("cache")).unwrap();
        assert_eq!(pool.padstack(ps.uuid), Some(&ps));
        assert!(registry.open(Uuid::new_v4(), dir.path()).is_err());
    }

    #[test]
    fn test_vias_directory_overrides_pool() {
        let pool_dir = TempDir::new().unwrap();
        let pool_ps = via_padstack("pool via");
        write_pool(pool_dir.path(), &pool_ps);
        let pool = Pool::open(pool_dir.path(), pool_dir.path()).unwrap();

        let vias_dir = TempDir::new().unwrap();
        let mut local = pool_ps.clone();
        local.name = "local via".into();
        std::fs::write(
            vias_dir.path().join("via.json"),
            serde_json::to_string(&local).unwrap(),
        )
        .unwrap();
        std::fs::write(vias_dir.path().join("notes.txt"), "ignored").unwrap();

        let vpp = ViaPadstackProvider::open(vias_dir.path()).unwrap();
        assert_eq!(vpp.len(), 1);
        assert_eq!(vpp.get(pool_ps.uuid, &pool).unwrap().name, "local via");

        let empty = ViaPadstackProvider::open(vias_dir.path().join("missing")).unwrap();
        assert_eq!(empty.get(pool_ps.uuid, &pool).unwrap().name, "pool via");
    }

    #[test]
    fn test_padstack_defaults_to_plated() {
        let ps: Padstack = serde_json::from_value(serde_json::json!({
            "uuid": Uuid::new_v4(),
            "name": "smd",
            "pad_diameter": 500_000
        }))
        .unwrap();
        assert!(ps.plated);
        assert!(!ps.has_hole());
        assert!(!ps.is_through());
    }
}
