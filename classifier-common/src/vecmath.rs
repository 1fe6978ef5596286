use serde::{Serialize, Deserialize};

// Basic 3D vector type for positions, velocities and forces.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline(always)]
    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }
    #[inline(always)]
    pub fn zero() -> Self { Self::new(0.0, 0.0, 0.0) }
    #[inline(always)]
    pub fn length_squared(self) -> f64 { self.x * self.x + self.y * self.y + self.z * self.z }
    #[inline(always)]
    pub fn length(self) -> f64 { self.length_squared().sqrt() }
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
    #[inline(always)]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    /// Radial distance from the chamber axis (z).
    #[inline(always)]
    pub fn radial_distance(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
    #[inline(always)]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Normalizes the vector, returning a zero vector if the length is zero or very small.
    pub fn normalize_or_zero(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > 1e-24 {
            self.scale(1.0 / len_sq.sqrt())
        } else {
            Vec3::zero()
        }
    }
}
