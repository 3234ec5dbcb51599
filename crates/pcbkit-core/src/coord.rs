//! Integer board coordinates.
//!
//! All geometry is kept in nanometres as `i64`. Floating point is only used
//! transiently for angles and projections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A point or vector on the board, in nanometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordi {
    pub x: i64,
    pub y: i64,
}

impl Coordi {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, other: Coordi) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    /// Squared magnitude.
    pub fn mag_sq(self) -> i128 {
        self.dot(self)
    }

    /// Euclidean length.
    pub fn mag(self) -> f64 {
        (self.mag_sq() as f64).sqrt()
    }

    /// Angle of the vector in radians, measured counter-clockwise from +X.
    pub fn angle(self) -> f64 {
        (self.y as f64).atan2(self.x as f64)
    }

    pub fn to_coordf(self) -> Coordf {
        Coordf::new(self.x as f64, self.y as f64)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Coordi) -> Coordi {
        Coordi::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Coordi) -> Coordi {
        Coordi::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl fmt::Display for Coordi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Coordi {
    type Output = Coordi;

    fn add(self, rhs: Coordi) -> Coordi {
        Coordi::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coordi {
    fn add_assign(&mut self, rhs: Coordi) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coordi {
    type Output = Coordi;

    fn sub(self, rhs: Coordi) -> Coordi {
        Coordi::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Coordi {
    fn sub_assign(&mut self, rhs: Coordi) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Coordi {
    type Output = Coordi;

    fn neg(self) -> Coordi {
        Coordi::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Coordi {
    type Output = Coordi;

    fn mul(self, rhs: i64) -> Coordi {
        Coordi::new(self.x * rhs, self.y * rhs)
    }
}

/// Floating point companion of [`Coordi`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordf {
    pub x: f64,
    pub y: f64,
}

impl Coordf {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Coordf) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn mag(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector pointing in the same direction, or `None` for the zero vector.
    pub fn normalized(self) -> Option<Coordf> {
        let m = self.mag();
        if m == 0.0 {
            None
        } else {
            Some(Coordf::new(self.x / m, self.y / m))
        }
    }

    /// Rounds to the nearest integer coordinate.
    pub fn round(self) -> Coordi {
        Coordi::new(self.x.round() as i64, self.y.round() as i64)
    }
}
