//! Small shared enums used across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of drawable objects a document may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Dimension,
    Via,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension => write!(f, "Dimension"),
            Self::Via => write!(f, "Via"),
        }
    }
}

/// The four artifact kinds the export pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Gerber,
    Pdf,
    Pnp,
    Step,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [Self::Gerber, Self::Pdf, Self::Pnp, Self::Step];
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gerber => write!(f, "gerber"),
            Self::Pdf => write!(f, "pdf"),
            Self::Pnp => write!(f, "pnp"),
            Self::Step => write!(f, "step"),
        }
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gerber" => Ok(Self::Gerber),
            "pdf" => Ok(Self::Pdf),
            "pnp" | "pick-and-place" => Ok(Self::Pnp),
            "step" => Ok(Self::Step),
            _ => Err(format!("Unknown export kind: {}", s)),
        }
    }
}

/// Copper and auxiliary board layers.
///
/// Serialized by name so settings records stay human-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Outline,
    TopSilkscreen,
    TopMask,
    TopCopper,
    BottomCopper,
    BottomMask,
    BottomSilkscreen,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Self::Outline,
        Self::TopSilkscreen,
        Self::TopMask,
        Self::TopCopper,
        Self::BottomCopper,
        Self::BottomMask,
        Self::BottomSilkscreen,
    ];

    pub fn is_copper(self) -> bool {
        matches!(self, Self::TopCopper | Self::BottomCopper)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Self::TopSilkscreen | Self::TopMask | Self::TopCopper)
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Self::BottomSilkscreen | Self::BottomMask | Self::BottomCopper
        )
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline => write!(f, "Outline"),
            Self::TopSilkscreen => write!(f, "Top Silkscreen"),
            Self::TopMask => write!(f, "Top Mask"),
            Self::TopCopper => write!(f, "Top Copper"),
            Self::BottomCopper => write!(f, "Bottom Copper"),
            Self::BottomMask => write!(f, "Bottom Mask"),
            Self::BottomSilkscreen => write!(f, "Bottom Silkscreen"),
        }
    }
}
