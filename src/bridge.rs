//! Host bridge
//!
//! Exposes a loaded board and its export pipeline to an external caller.
//! Every failure that crosses this boundary becomes [`HostError::Io`] with
//! the original message text; the structured error kinds stay inside the
//! export crate.

use anyhow::Context;
use pcbkit_core::{CallbackAbort, Error};
use pcbkit_export::{
    Block, Board, ExportAdapter, Pool, PoolRegistry, ProgressCallback, ViaPadstackProvider,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// The single error category seen by hosts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{0}")]
    Io(String),
}

impl From<Error> for HostError {
    fn from(err: Error) -> Self {
        Self::Io(err.to_string())
    }
}

fn host(err: impl Into<Error>) -> HostError {
    HostError::from(err.into())
}

fn closed() -> HostError {
    host(Error::other("board handle is closed"))
}

/// Files making up a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub pool_uuid: Uuid,
    /// Falls back to the configured pool cache when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_cache_directory: Option<PathBuf>,
    pub top_block_filename: PathBuf,
    pub vias_directory: PathBuf,
    pub board_filename: PathBuf,
}

impl Project {
    /// Reads a project descriptor. Relative paths are taken relative to the
    /// descriptor's directory.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let mut project: Project = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project file {}", path.display()))?;
        if let Some(dir) = path.parent() {
            for p in [
                project.pool_cache_directory.as_mut(),
                Some(&mut project.top_block_filename),
                Some(&mut project.vias_directory),
                Some(&mut project.board_filename),
            ]
            .into_iter()
            .flatten()
            {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        Ok(project)
    }

    /// Uses `dir` as the pool cache unless the descriptor names one.
    pub fn with_default_pool_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        if self.pool_cache_directory.is_none() {
            self.pool_cache_directory = Some(dir.into());
        }
        self
    }
}

struct Loaded {
    pool: Pool,
    block: Block,
    vias: ViaPadstackProvider,
    board: Board,
}

/// Owns a loaded board together with its pool, block and via padstacks.
pub struct BoardHandle {
    loaded: Option<Loaded>,
}

impl BoardHandle {
    /// Loads the project and prepares the board for export.
    pub fn open(pools: &PoolRegistry, project: &Project) -> Result<Self, HostError> {
        Self::load(pools, project).map_err(|e| HostError::Io(format!("{:#}", e)))
    }

    fn load(pools: &PoolRegistry, project: &Project) -> anyhow::Result<Self> {
        let cache = project
            .pool_cache_directory
            .as_deref()
            .context("project does not name a pool cache directory")?;
        let pool = pools.open(project.pool_uuid, cache)?;
        let block = Block::load_from_file(&project.top_block_filename)?;
        let vias = ViaPadstackProvider::open(&project.vias_directory)?;
        let mut board = Board::load_from_file(&project.board_filename, &block, &pool, &vias)?;
        board.expand();
        board.update_planes();
        info!(
            "Opened board '{}' from {}",
            board.name,
            project.board_filename.display()
        );
        Ok(Self {
            loaded: Some(Loaded {
                pool,
                block,
                vias,
                board,
            }),
        })
    }

    fn loaded(&self) -> Result<&Loaded, HostError> {
        self.loaded.as_ref().ok_or_else(closed)
    }

    fn adapter(&self) -> Result<ExportAdapter<'_>, HostError> {
        let loaded = self.loaded()?;
        Ok(ExportAdapter::new(&loaded.board, &loaded.pool))
    }

    pub fn is_open(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn board(&self) -> Option<&Board> {
        self.loaded.as_ref().map(|l| &l.board)
    }

    pub fn block(&self) -> Option<&Block> {
        self.loaded.as_ref().map(|l| &l.block)
    }

    pub fn via_padstacks(&self) -> Option<&ViaPadstackProvider> {
        self.loaded.as_ref().map(|l| &l.vias)
    }

    /// Resolves relative output paths against `dir` instead of the board
    /// file's directory.
    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) -> Result<(), HostError> {
        let loaded = self.loaded.as_mut().ok_or_else(closed)?;
        loaded.board.set_base_directory(dir);
        Ok(())
    }

    /// Releases the board, block, pool and via padstacks. Further calls fail.
    pub fn close(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            debug!("Closed board '{}'", loaded.board.name);
        }
    }

    pub fn get_gerber_export_settings(&self) -> Result<Value, HostError> {
        Ok(self.adapter()?.get_gerber_export_settings())
    }

    pub fn export_gerber(&self, record: &Value) -> Result<(), HostError> {
        self.adapter()?.export_gerber(record).map_err(host)
    }

    pub fn get_pdf_export_settings(&self) -> Result<Value, HostError> {
        Ok(self.adapter()?.get_pdf_export_settings())
    }

    pub fn export_pdf(&self, record: &Value) -> Result<(), HostError> {
        self.adapter()?.export_pdf(record).map_err(host)
    }

    pub fn get_pnp_export_settings(&self) -> Result<Value, HostError> {
        Ok(self.adapter()?.get_pnp_export_settings())
    }

    pub fn export_pnp(&self, record: &Value) -> Result<(), HostError> {
        self.adapter()?.export_pnp(record).map_err(host)
    }

    pub fn get_step_export_settings(&self) -> Result<Value, HostError> {
        Ok(self.adapter()?.get_step_export_settings())
    }

    pub fn export_step(
        &self,
        record: &Value,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<(), HostError> {
        self.adapter()?
            .export_step(record, progress)
            .map_err(host)
    }
}

impl Drop for BoardHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Adapts a host callback that reports failure as a message.
pub fn progress_from<F>(mut callback: F) -> impl FnMut(&str) -> Result<(), CallbackAbort>
where
    F: FnMut(&str) -> Result<(), String>,
{
    move |milestone| callback(milestone).map_err(CallbackAbort::new)
}
