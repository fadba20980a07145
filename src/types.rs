//! Strongly-typed numeric primitives for scene layout (zero-cost newtypes).
//!
//! Layout happens in diagram units with the Y axis pointing up (row
//! stacking grows toward negative y). Conversion to output pixels only
//! happens through [`Scaler`] when the SVG is written.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Length in diagram units
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    /// Create a non-negative Length with validation
    #[inline]
    pub fn try_non_negative(val: f64) -> Result<Length, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Length(val))
        }
    }

    #[inline]
    pub fn abs(self) -> Length {
        Length(self.0.abs())
    }

    #[inline]
    pub fn min(self, other: Length) -> Length {
        Length(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Length) -> Length {
        Length(self.0.max(other.0))
    }

    /// Get the raw value (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Checked division returning None if divisor is zero
    #[inline]
    pub fn checked_div(self, rhs: Length) -> Option<Scalar> {
        if rhs.0 == 0.0 {
            None
        } else {
            Some(Scalar(self.0 / rhs.0))
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length { Length(self.0 + rhs.0) }
}
impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length { Length(self.0 - rhs.0) }
}
impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length { Length(self.0 * rhs) }
}
impl Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Length { Length(self.0 / rhs) }
}

// NOTE: Length / Length is intentionally NOT implemented as a trait.
// Use Length::checked_div() which returns Option<Scalar> and handles zero divisor.

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length { Length(-self.0) }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Length) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        Length(iter.map(|l| l.0).sum())
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Length(v)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unitless scalar (ratios, redistribution factors)
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Scalar(pub f64);

impl Scalar {
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }
}

/// Length * Scalar = Length (scaling a length)
impl Mul<Scalar> for Length {
    type Output = Length;
    fn mul(self, rhs: Scalar) -> Length {
        Length(self.0 * rhs.0)
    }
}

/// Convert diagram units → output pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    pub factor: f64,
}

impl Scaler {
    /// Create a Scaler with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(factor: f64) -> Result<Self, NumericError> {
        if factor.is_nan() {
            Err(NumericError::NaN)
        } else if factor.is_infinite() {
            Err(NumericError::Infinite)
        } else if factor == 0.0 {
            Err(NumericError::Zero)
        } else if factor < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Scaler { factor })
        }
    }

    /// Convert a length to raw f64 pixels (convenience for SVG output).
    #[inline]
    pub fn px(&self, l: Length) -> f64 {
        l.0 * self.factor
    }
}

/// Generic 2D point
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self { Point { x, y } }
}

impl Point<Length> {
    pub fn midpoint(self, other: Self) -> Self {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn to_dvec(self) -> DVec2 {
        dvec2(self.x.0, self.y.0)
    }

    pub fn from_dvec(v: DVec2) -> Self {
        Point::new(Length(v.x), Length(v.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size<T> {
    pub w: T,
    pub h: T,
}

impl<T> Size<T> {
    pub fn new(w: T, h: T) -> Self { Size { w, h } }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox<T> {
    pub min: Point<T>,
    pub max: Point<T>,
}

impl BBox<Length> {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: Point { x: Length(f64::MAX), y: Length(f64::MAX) },
            max: Point { x: Length(f64::MIN), y: Length(f64::MIN) },
        }
    }

    /// Box spanning `origin` (bottom-left) to `origin + size`
    pub fn from_origin(origin: Point<Length>, size: Size<Length>) -> Self {
        BBox {
            min: origin,
            max: Point::new(origin.x + size.w, origin.y + size.h),
        }
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x.0 > self.max.x.0 || self.min.y.0 > self.max.y.0
    }

    pub fn expand_point(&mut self, p: Point<Length>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn expand_box(&mut self, other: &BBox<Length>) {
        if other.is_empty() {
            return;
        }
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    pub fn width(&self) -> Length { self.max.x - self.min.x }

    pub fn height(&self) -> Length { self.max.y - self.min.y }

    pub fn center(&self) -> Point<Length> {
        Point {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for BBox<Length> {
    fn default() -> Self {
        Self::new()
    }
}

/// A displacement/offset vector (not an absolute position)
/// Use this for translations; Point + Offset = Point
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset<T> {
    pub dx: T,
    pub dy: T,
}

impl<T> Offset<T> {
    pub fn new(dx: T, dy: T) -> Self {
        Offset { dx, dy }
    }
}

/// A unit direction vector (dimensionless, normalized)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct UnitVec {
    dx: f64,
    dy: f64,
}

impl UnitVec {
    pub const EAST: UnitVec = UnitVec { dx: 1.0, dy: 0.0 };

    /// Create a normalized unit vector from components.
    /// Returns None if the input has zero length (or is not finite).
    pub fn normalized(dx: f64, dy: f64) -> Option<Self> {
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(UnitVec { dx: dx / len, dy: dy / len })
        }
    }

    pub fn dx(self) -> f64 { self.dx }

    pub fn dy(self) -> f64 { self.dy }

    /// Rotate 90 degrees counter-clockwise
    pub fn perp(self) -> UnitVec {
        UnitVec { dx: -self.dy, dy: self.dx }
    }
}

/// Multiply a unit vector by a length to get an offset (not a point!)
impl Mul<Length> for UnitVec {
    type Output = Offset<Length>;
    fn mul(self, len: Length) -> Offset<Length> {
        Offset {
            dx: Length(self.dx * len.0),
            dy: Length(self.dy * len.0),
        }
    }
}

impl Add<Offset<Length>> for Point<Length> {
    type Output = Point<Length>;
    fn add(self, rhs: Offset<Length>) -> Point<Length> {
        Point {
            x: self.x + rhs.dx,
            y: self.y + rhs.dy,
        }
    }
}

impl Sub<Offset<Length>> for Point<Length> {
    type Output = Point<Length>;
    fn sub(self, rhs: Offset<Length>) -> Point<Length> {
        Point {
            x: self.x - rhs.dx,
            y: self.y - rhs.dy,
        }
    }
}

impl Sub<Point<Length>> for Point<Length> {
    type Output = Offset<Length>;
    fn sub(self, rhs: Point<Length>) -> Offset<Length> {
        Offset {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

/// Convenient aliases
pub type Pt = Point<Length>;
pub type Bounds = BBox<Length>;

/// Shorthand for building a point from raw values
pub fn pt(x: f64, y: f64) -> Pt {
    Point::new(Length(x), Length(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_try_non_negative_rejects_negative() {
        assert_eq!(Length::try_non_negative(-1.0), Err(NumericError::Negative));
        assert_eq!(Length::try_non_negative(f64::NAN), Err(NumericError::NaN));
        assert!(Length::try_non_negative(0.0).is_ok());
    }

    #[test]
    fn length_arithmetic() {
        let a = Length(3.0);
        let b = Length(2.0);

        assert_eq!(a + b, Length(5.0));
        assert_eq!(a - b, Length(1.0));
        assert_eq!(a * 2.0, Length(6.0));
        assert_eq!(a / 2.0, Length(1.5));
        assert_eq!(-a, Length(-3.0));
    }

    #[test]
    fn length_sum() {
        let total: Length = [Length(1.0), Length(2.5), Length(3.5)].into_iter().sum();
        assert_eq!(total, Length(7.0));
    }

    #[test]
    fn length_checked_div_by_zero() {
        assert_eq!(Length(6.0).checked_div(Length(0.0)), None);
        assert_eq!(Length(6.0).checked_div(Length(2.0)), Some(Scalar(3.0)));
    }

    #[test]
    fn scaler_try_new_rejects_bad_factors() {
        assert_eq!(Scaler::try_new(0.0), Err(NumericError::Zero));
        assert_eq!(Scaler::try_new(-1.0), Err(NumericError::Negative));
        assert_eq!(Scaler::try_new(f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(Scaler::try_new(2.0).unwrap().px(Length(3.0)), 6.0);
    }

    #[test]
    fn unitvec_normalized_valid() {
        let v = UnitVec::normalized(3.0, 4.0).unwrap();
        assert!((v.dx() - 0.6).abs() < 1e-10);
        assert!((v.dy() - 0.8).abs() < 1e-10);
    }

    #[test]
    fn unitvec_normalized_zero_returns_none() {
        assert_eq!(UnitVec::normalized(0.0, 0.0), None);
    }

    #[test]
    fn unitvec_perp_is_ccw() {
        let p = UnitVec::EAST.perp();
        assert_eq!(Some(p), UnitVec::normalized(0.0, 1.0));
    }

    #[test]
    fn point_offset_arithmetic() {
        let p = pt(1.0, 2.0);
        let o = Offset::new(Length(3.0), Length(4.0));
        assert_eq!(p + o, pt(4.0, 6.0));
        assert_eq!((p + o) - p, o);
        assert_eq!(pt(0.0, 0.0).midpoint(pt(4.0, 6.0)), pt(2.0, 3.0));
    }

    #[test]
    fn bbox_expand_and_measure() {
        let mut bb = Bounds::new();
        assert!(bb.is_empty());
        bb.expand_point(pt(1.0, 2.0));
        bb.expand_point(pt(5.0, 8.0));
        assert_eq!(bb.width(), Length(4.0));
        assert_eq!(bb.height(), Length(6.0));
        assert_eq!(bb.center(), pt(3.0, 5.0));
    }

    #[test]
    fn bbox_from_origin() {
        let bb = Bounds::from_origin(pt(10.0, -5.0), Size::new(Length(20.0), Length(5.0)));
        assert_eq!(bb.max, pt(30.0, 0.0));
    }
}
