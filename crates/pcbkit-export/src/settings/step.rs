use super::{require_non_empty, SettingsRecord};
use pcbkit_core::{ExportKind, ValidationError};
use serde::{Deserialize, Serialize};

/// 3-D (ISO 10303-21) export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExportSettings {
    pub filename: String,
    /// Prepended to every product name.
    pub prefix: String,
    pub include_3d_models: bool,
    /// Holes smaller than this (nm) are left out.
    pub min_diameter: u64,
}

impl StepExportSettings {
    pub fn for_board(name: &str) -> Self {
        Self {
            filename: format!("{}.step", name),
            prefix: String::new(),
            include_3d_models: true,
            min_diameter: 0,
        }
    }
}

impl Default for StepExportSettings {
    fn default() -> Self {
        Self::for_board("board")
    }
}

impl SettingsRecord for StepExportSettings {
    const KIND: ExportKind = ExportKind::Step;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(Self::KIND, "filename", &self.filename)
    }
}
