#![warn(missing_docs)]
//! Two-dimensional vector algebra used for all scene geometry.
//!
//! [`Vector2`] is a plain value type. All operations return new values, except [`Vector2::set`] which
//! modifies a vector in place. Degenerate operations never panic: dividing by zero yields (signed)
//! infinities and normalizing the zero vector yields the zero vector.
use nalgebra::{Point2, Rotation2};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub},
};

/// A two-dimensional vector (or point) in scene units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    /// x component
    pub x: f64,
    /// y component
    pub y: f64,
}
impl Vector2 {
    /// Creates a new [`Vector2`].
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    /// The zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
    /// Create a unit vector pointing along the given angle (in radians, measured from the positive x axis).
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }
    /// Linear interpolation between `a` and `b`.
    ///
    /// The parameter `t` is clamped to the interval `[0.0, 1.0]`.
    #[must_use]
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        a + (b - a) * t
    }
    /// Set both components of this vector in place.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
    /// Returns the sum `self + other`.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
    /// Returns the difference `self - other`.
    #[must_use]
    pub fn subtract(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
    /// Returns this vector scaled by `factor`.
    #[must_use]
    pub fn multiply(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
    /// Returns this vector divided by `divisor`.
    ///
    /// A division by zero follows IEEE-754 semantics: non-zero components become signed infinities,
    /// zero components become `NaN`.
    #[must_use]
    pub fn divide(self, divisor: f64) -> Self {
        Self::new(self.x / divisor, self.y / divisor)
    }
    /// Returns the length of this vector.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }
    /// Returns the squared length of this vector.
    #[must_use]
    pub fn magnitude_squared(self) -> f64 {
        self.x.mul_add(self.x, self.y * self.y)
    }
    /// Returns a unit vector with the same direction.
    ///
    /// The zero vector (and any vector with a non-finite length) normalizes to the zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            Self::zero()
        } else {
            self.divide(mag)
        }
    }
    /// Returns the dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }
    /// Returns the scalar (z-component of the) cross product of two vectors.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }
    /// Returns this vector rotated counter-clockwise by `angle` (in radians).
    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        let rotated = Rotation2::new(angle) * nalgebra::Vector2::from(self);
        rotated.into()
    }
    /// Returns the vector rotated by +90° (the left-hand perpendicular).
    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }
    /// Returns the distance between two points.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).magnitude()
    }
    /// Returns the squared distance between two points.
    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        (other - self).magnitude_squared()
    }
    /// Returns the angle of this vector with respect to the positive x axis in the range `[-π, π]`.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }
    /// Returns `true` if both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}
impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}
impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.multiply(rhs)
    }
}
impl Mul<Vector2> for f64 {
    type Output = Vector2;
    fn mul(self, rhs: Vector2) -> Vector2 {
        rhs.multiply(self)
    }
}
impl Div<f64> for Vector2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.divide(rhs)
    }
}
impl Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
impl From<nalgebra::Vector2<f64>> for Vector2 {
    fn from(v: nalgebra::Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }
}
impl From<Vector2> for nalgebra::Vector2<f64> {
    fn from(v: Vector2) -> Self {
        Self::new(v.x, v.y)
    }
}
impl From<Point2<f64>> for Vector2 {
    fn from(p: Point2<f64>) -> Self {
        Self::new(p.x, p.y)
    }
}
impl From<Vector2> for Point2<f64> {
    fn from(v: Vector2) -> Self {
        Self::new(v.x, v.y)
    }
}
impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
impl Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    #[test]
    fn arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);
        assert_eq!(a.add(b), Vector2::new(4.0, 1.0));
        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a.subtract(b), Vector2::new(-2.0, 3.0));
        assert_eq!(a.multiply(2.0), Vector2::new(2.0, 4.0));
        assert_eq!(2.0 * a, Vector2::new(2.0, 4.0));
        assert_eq!(a.divide(2.0), Vector2::new(0.5, 1.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
    }
    #[test]
    fn divide_by_zero() {
        let v = Vector2::new(1.0, -2.0).divide(0.0);
        assert_eq!(v.x, f64::INFINITY);
        assert_eq!(v.y, f64::NEG_INFINITY);
    }
    #[test]
    fn magnitude() {
        let v = Vector2::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
        assert_eq!(v.magnitude_squared(), 25.0);
    }
    #[test]
    fn normalize() {
        for (x, y) in [(3.0, 4.0), (-1.0e-8, 2.0e-8), (1e12, -3e11), (0.0, -7.0)] {
            assert_abs_diff_eq!(Vector2::new(x, y).normalize().magnitude(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(Vector2::zero().normalize(), Vector2::zero());
        assert_eq!(
            Vector2::new(f64::INFINITY, 0.0).normalize(),
            Vector2::zero()
        );
    }
    #[test]
    fn dot_cross() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), 1.0);
        assert_eq!(b.cross(a), -1.0);
    }
    #[test]
    fn rotate() {
        let v = Vector2::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_eq!(Vector2::new(2.0, 1.0).perpendicular(), Vector2::new(-1.0, 2.0));
    }
    #[test]
    fn distance() {
        let a = Vector2::new(1.0, 1.0);
        let b = Vector2::new(4.0, 5.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(a.distance_squared_to(b), 25.0);
    }
    #[test]
    fn angle() {
        assert_abs_diff_eq!(Vector2::new(0.0, 1.0).angle(), FRAC_PI_2);
        assert_abs_diff_eq!(Vector2::new(-1.0, 0.0).angle(), PI);
        let v = Vector2::from_angle(0.3);
        assert_abs_diff_eq!(v.angle(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(v.magnitude(), 1.0, epsilon = 1e-12);
    }
    #[test]
    fn lerp() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, -10.0);
        assert_eq!(Vector2::lerp(a, b, 0.5), Vector2::new(5.0, -5.0));
        assert_eq!(Vector2::lerp(a, b, -1.0), a);
        assert_eq!(Vector2::lerp(a, b, 2.0), b);
    }
    #[test]
    fn set() {
        let mut v = Vector2::zero();
        v.set(1.0, 2.0);
        assert_eq!(v, Vector2::new(1.0, 2.0));
    }
    #[test]
    fn nalgebra_conversion() {
        let v: nalgebra::Vector2<f64> = Vector2::new(1.0, 2.0).into();
        assert_eq!(v, nalgebra::Vector2::new(1.0, 2.0));
        let p: Vector2 = Point2::new(3.0, 4.0).into();
        assert_eq!(p, Vector2::new(3.0, 4.0));
    }
    #[test]
    fn display() {
        assert_eq!(format!("{}", Vector2::new(1.0, -2.5)), "(1, -2.5)");
    }
}
