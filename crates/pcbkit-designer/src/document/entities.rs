//! Drawable entities: dimensions and vias.

use pcbkit_core::{format_length, Coordf, Coordi, MeasurementSystem, ObjectType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a dimension measures the distance between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionMode {
    /// Straight-line distance.
    #[default]
    Distance,
    /// X extent only.
    Horizontal,
    /// Y extent only.
    Vertical,
}

impl DimensionMode {
    pub fn cycle(self) -> Self {
        match self {
            Self::Distance => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Distance,
        }
    }
}

impl std::fmt::Display for DimensionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// A measurement annotation between two anchor points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub uuid: Uuid,
    /// The document this dimension belongs to.
    pub document: Uuid,
    pub p0: Coordi,
    pub p1: Coordi,
    pub mode: DimensionMode,
    /// Signed offset of the label line from the measured segment.
    pub label_distance: i64,
    pub label_size: u64,
}

impl Dimension {
    pub const DEFAULT_LABEL_SIZE: u64 = 1_500_000;

    pub fn new(uuid: Uuid, document: Uuid, at: Coordi) -> Self {
        Self {
            uuid,
            document,
            p0: at,
            p1: at,
            mode: DimensionMode::Distance,
            label_distance: 0,
            label_size: Self::DEFAULT_LABEL_SIZE,
        }
    }

    /// The measured vector for the current mode.
    pub fn measured_vector(&self) -> Coordi {
        let d = self.p1 - self.p0;
        match self.mode {
            DimensionMode::Distance => d,
            DimensionMode::Horizontal => Coordi::new(d.x, 0),
            DimensionMode::Vertical => Coordi::new(0, d.y),
        }
    }

    /// The measured length in nanometres.
    pub fn length(&self) -> i64 {
        self.measured_vector().mag().round() as i64
    }

    /// Signed distance of `delta` along the label normal.
    ///
    /// A zero-length measurement projects onto +Y.
    pub fn project(&self, delta: Coordi) -> i64 {
        let v = self.measured_vector().to_coordf();
        let normal = match v.normalized() {
            Some(n) => Coordf::new(-n.y, n.x),
            None => Coordf::new(0.0, 1.0),
        };
        delta.to_coordf().dot(normal).round() as i64
    }

    pub fn label_text(&self, system: MeasurementSystem) -> String {
        format_length(self.length(), system)
    }
}

/// A plated through hole connecting copper layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub uuid: Uuid,
    pub position: Coordi,
    pub padstack: Uuid,
    #[serde(default)]
    pub net: Option<String>,
}

impl Via {
    pub fn new(uuid: Uuid, position: Coordi, padstack: Uuid) -> Self {
        Self {
            uuid,
            position,
            padstack,
            net: None,
        }
    }
}

/// Any entity stored in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Dimension(Dimension),
    Via(Via),
}

impl Entity {
    pub fn uuid(&self) -> Uuid {
        match self {
            Entity::Dimension(d) => d.uuid,
            Entity::Via(v) => v.uuid,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Entity::Dimension(_) => ObjectType::Dimension,
            Entity::Via(_) => ObjectType::Via,
        }
    }

    pub fn as_dimension(&self) -> Option<&Dimension> {
        match self {
            Entity::Dimension(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_via(&self) -> Option<&Via> {
        match self {
            Entity::Via(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Dimension> for Entity {
    fn from(d: Dimension) -> Self {
        Entity::Dimension(d)
    }
}

impl From<Via> for Entity {
    fn from(v: Via) -> Self {
        Entity::Via(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(p0: Coordi, p1: Coordi) -> Dimension {
        let mut d = Dimension::new(Uuid::new_v4(), Uuid::nil(), p0);
        d.p1 = p1;
        d
    }

    #[test]
    fn test_length_per_mode() {
        let mut d = dim(Coordi::new(0, 0), Coordi::new(3_000_000, 4_000_000));
        assert_eq!(d.length(), 5_000_000);
        d.mode = DimensionMode::Horizontal;
        assert_eq!(d.length(), 3_000_000);
        d.mode = DimensionMode::Vertical;
        assert_eq!(d.length(), 4_000_000);
    }

    #[test]
    fn test_project_on_normal() {
        let d = dim(Coordi::new(0, 0), Coordi::new(10, 0));
        assert_eq!(d.project(Coordi::new(5, 7)), 7);
        assert_eq!(d.project(Coordi::new(5, -2)), -2);
    }

    #[test]
    fn test_degenerate_projects_on_y() {
        let d = dim(Coordi::new(1, 1), Coordi::new(1, 1));
        assert_eq!(d.length(), 0);
        assert_eq!(d.project(Coordi::new(9, 4)), 4);
    }

    #[test]
    fn test_label_text() {
        let d = dim(Coordi::new(0, 0), Coordi::new(0, 2_500_000));
        assert_eq!(d.label_text(MeasurementSystem::Metric), "2.50 mm");
        assert_eq!(d.label_text(MeasurementSystem::Imperial), "0.098 in");
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(DimensionMode::Distance.cycle(), DimensionMode::Horizontal);
        assert_eq!(DimensionMode::Vertical.cycle(), DimensionMode::Distance);
    }
}
