use super::{require_non_empty, SettingsRecord};
use pcbkit_core::{ExportKind, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PnpMode {
    /// One file for both sides.
    #[default]
    Merged,
    /// One file per side.
    Individual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PnpColumn {
    Refdes,
    Value,
    Mpn,
    Manufacturer,
    Package,
    X,
    Y,
    Angle,
    Side,
}

impl PnpColumn {
    pub const ALL: [PnpColumn; 9] = [
        Self::Refdes,
        Self::Value,
        Self::Mpn,
        Self::Manufacturer,
        Self::Package,
        Self::X,
        Self::Y,
        Self::Angle,
        Self::Side,
    ];
}

impl fmt::Display for PnpColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Refdes => "Ref",
            Self::Value => "Value",
            Self::Mpn => "MPN",
            Self::Manufacturer => "Manufacturer",
            Self::Package => "Package",
            Self::X => "X",
            Self::Y => "Y",
            Self::Angle => "Angle",
            Self::Side => "Side",
        };
        f.write_str(name)
    }
}

/// Pick-and-place (component placement) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnpExportSettings {
    pub output_directory: String,
    pub mode: PnpMode,
    pub filename_merged: String,
    pub filename_top: String,
    pub filename_bottom: String,
    pub columns: Vec<PnpColumn>,
    pub include_nopopulate: bool,
    /// Decimal places for millimetre positions.
    pub position_format: u8,
    /// Text written in the side column for top parts.
    pub top_side: String,
    pub bottom_side: String,
}

impl PnpExportSettings {
    pub fn for_board(name: &str) -> Self {
        Self {
            output_directory: "pnp".to_string(),
            mode: PnpMode::Merged,
            filename_merged: format!("{}-pnp.csv", name),
            filename_top: format!("{}-pnp-top.csv", name),
            filename_bottom: format!("{}-pnp-bottom.csv", name),
            columns: PnpColumn::ALL.to_vec(),
            include_nopopulate: false,
            position_format: 3,
            top_side: "top".to_string(),
            bottom_side: "bottom".to_string(),
        }
    }
}

impl Default for PnpExportSettings {
    fn default() -> Self {
        Self::for_board("board")
    }
}

impl SettingsRecord for PnpExportSettings {
    const KIND: ExportKind = ExportKind::Pnp;

    fn validate(&self) -> Result<(), ValidationError> {
        let kind = Self::KIND;
        require_non_empty(kind, "output_directory", &self.output_directory)?;
        match self.mode {
            PnpMode::Merged => require_non_empty(kind, "filename_merged", &self.filename_merged)?,
            PnpMode::Individual => {
                require_non_empty(kind, "filename_top", &self.filename_top)?;
                require_non_empty(kind, "filename_bottom", &self.filename_bottom)?;
                if self.filename_top == self.filename_bottom {
                    return Err(ValidationError::invalid(
                        kind,
                        "filename_bottom",
                        "must differ from filename_top",
                    ));
                }
            }
        }
        if self.columns.is_empty() {
            return Err(ValidationError::invalid(kind, "columns", "must not be empty"));
        }
        if self.position_format > 6 {
            return Err(ValidationError::invalid(
                kind,
                "position_format",
                "at most 6 decimal places",
            ));
        }
        Ok(())
    }
}
