//! Pointer restriction: axis lock and angle snapping.
//!
//! [`constrain`] is a pure function of the raw pointer position, the
//! reference point and the mode. [`Restriction`] carries the mode selected
//! by the user across events of one tool invocation.

use super::Key;
use pcbkit_core::{Coordf, Coordi};
use serde::{Deserialize, Serialize};

/// Key cycling through all restriction modes.
pub const KEY_CYCLE_RESTRICT: char = '/';
/// Key toggling between the two axis locks.
pub const KEY_CYCLE_RESTRICT_XY: char = 'x';

/// Active constraint applied to pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictMode {
    /// No constraint.
    #[default]
    Arbitrary,
    /// Horizontal: the result keeps the reference point's Y.
    X,
    /// Vertical: the result keeps the reference point's X.
    Y,
    /// Direction snapped to a multiple of the configured angle step.
    AngleSnap,
}

impl RestrictMode {
    pub fn cycle(self) -> Self {
        match self {
            Self::Arbitrary => Self::X,
            Self::X => Self::Y,
            Self::Y => Self::AngleSnap,
            Self::AngleSnap => Self::Arbitrary,
        }
    }

    pub fn cycle_xy(self) -> Self {
        match self {
            Self::X => Self::Y,
            _ => Self::X,
        }
    }
}

/// Result of constraining a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constrained {
    pub coords: Coordi,
    /// The constraint that shaped `coords`, `None` when unconstrained.
    pub applied: Option<RestrictMode>,
}

/// Constrains `raw` relative to `reference`.
///
/// `angle_step_deg` is only used by [`RestrictMode::AngleSnap`]; a
/// non-positive step disables snapping. Snapped directions on a multiple
/// of 45° are exact, so re-applying the constraint is a no-op.
pub fn constrain(
    mode: RestrictMode,
    reference: Coordi,
    raw: Coordi,
    angle_step_deg: f64,
) -> Constrained {
    let coords = match mode {
        RestrictMode::Arbitrary => {
            return Constrained {
                coords: raw,
                applied: None,
            }
        }
        RestrictMode::X => Coordi::new(raw.x, reference.y),
        RestrictMode::Y => Coordi::new(reference.x, raw.y),
        RestrictMode::AngleSnap => snap_angle(reference, raw, angle_step_deg),
    };
    Constrained {
        coords,
        applied: Some(mode),
    }
}

fn snap_angle(reference: Coordi, raw: Coordi, step_deg: f64) -> Coordi {
    let delta = raw - reference;
    if delta == Coordi::default() || step_deg.is_nan() || step_deg <= 0.0 {
        return raw;
    }
    let snapped_deg = (delta.angle().to_degrees() / step_deg).round() * step_deg;
    match octant_direction(snapped_deg) {
        Some(dir) => reference + dir * snap_length(delta, dir),
        None => {
            let snapped = snapped_deg.to_radians();
            let dir = Coordf::new(snapped.cos(), snapped.sin());
            let len = delta.to_coordf().dot(dir).round();
            reference + Coordf::new(dir.x * len, dir.y * len).round()
        }
    }
}

/// Integer unit step for directions on a multiple of 45°.
fn octant_direction(deg: f64) -> Option<Coordi> {
    let eighths = deg / 45.0;
    if (eighths - eighths.round()).abs() > 1e-9 {
        return None;
    }
    let dir = match (eighths.round() as i64).rem_euclid(8) {
        0 => Coordi::new(1, 0),
        1 => Coordi::new(1, 1),
        2 => Coordi::new(0, 1),
        3 => Coordi::new(-1, 1),
        4 => Coordi::new(-1, 0),
        5 => Coordi::new(-1, -1),
        6 => Coordi::new(0, -1),
        _ => Coordi::new(1, -1),
    };
    Some(dir)
}

/// Multiple of `dir` closest to `delta`. One scalar is rounded, so the
/// result lies exactly on `dir`.
fn snap_length(delta: Coordi, dir: Coordi) -> i64 {
    let along = delta.dot(dir) as f64;
    (along / dir.mag_sq() as f64).round() as i64
}

/// Restriction preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestrictSettings {
    pub default_mode: RestrictMode,
    pub angle_step_deg: f64,
}

impl Default for RestrictSettings {
    fn default() -> Self {
        Self {
            default_mode: RestrictMode::Arbitrary,
            angle_step_deg: 45.0,
        }
    }
}

/// Restriction state owned by a tool for the length of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    mode: RestrictMode,
    angle_step_deg: f64,
}

impl Restriction {
    pub fn new(settings: RestrictSettings) -> Self {
        Self {
            mode: settings.default_mode,
            angle_step_deg: settings.angle_step_deg,
        }
    }

    pub fn mode(&self) -> RestrictMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RestrictMode) {
        self.mode = mode;
    }

    pub fn angle_step_deg(&self) -> f64 {
        self.angle_step_deg
    }

    pub fn apply(&self, reference: Coordi, raw: Coordi) -> Constrained {
        constrain(self.mode, reference, raw, self.angle_step_deg)
    }

    /// Handles the restriction keys. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(KEY_CYCLE_RESTRICT) => {
                self.mode = self.mode.cycle();
                true
            }
            Key::Char(KEY_CYCLE_RESTRICT_XY) => {
                self.mode = self.mode.cycle_xy();
                true
            }
            _ => false,
        }
    }

    /// Status fragment describing the active mode.
    pub fn tip(&self) -> String {
        match self.mode {
            RestrictMode::Arbitrary => "restrict: arbitrary".to_string(),
            RestrictMode::X => "restrict: X only".to_string(),
            RestrictMode::Y => "restrict: Y only".to_string(),
            RestrictMode::AngleSnap => format!("restrict: {}°", self.angle_step_deg),
        }
    }
}

impl Default for Restriction {
    fn default() -> Self {
        Self::new(RestrictSettings::default())
    }
}

/// Capability of tools whose pointer input goes through a [`Restriction`].
pub trait RestrictedTool {
    fn restriction(&self) -> &Restriction;

    fn restriction_mut(&mut self) -> &mut Restriction;

    fn get_coord_restrict(&self, reference: Coordi, raw: Coordi) -> Coordi {
        self.restriction().apply(reference, raw).coords
    }

    fn handle_restrict_key(&mut self, key: Key) -> bool {
        self.restriction_mut().handle_key(key)
    }
}
