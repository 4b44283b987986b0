//! Visual element model and visual-equivalence checks
//!
//! A [`VisualElement`] is the atomic drawable unit of a puzzle cell. Two
//! elements may carry different raw parameters and still render the same
//! picture (a square rotated by 90° is still a square), so every comparison
//! between answer options goes through [`are_visually_identical`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance used when comparing reduced rotations.
///
/// Trigonometric levels produce fractional rotations, so exact float
/// equality after reduction would split congruent angles like 0 and 89.99999999999.
const ROTATION_EPSILON: f64 = 1e-9;

/// The drawable primitive of a visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Diamond,
}

impl ShapeKind {
    /// Every shape, in catalog order.
    pub const ALL: [ShapeKind; 4] =
        [ShapeKind::Circle, ShapeKind::Square, ShapeKind::Triangle, ShapeKind::Diamond];

    /// Rotational symmetry period in degrees.
    ///
    /// Returns `None` for shapes that look the same at every rotation.
    pub fn symmetry_period(self) -> Option<f64> {
        match self {
            ShapeKind::Circle => None,
            ShapeKind::Square | ShapeKind::Diamond => Some(90.0),
            ShapeKind::Triangle => Some(120.0),
        }
    }

    /// Lowercase identifier used in config files and output.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a shape name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shape '{0}' (expected circle, square, triangle or diamond)")]
pub struct ParseShapeError(pub String);

impl FromStr for ShapeKind {
    type Err = ParseShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(ShapeKind::Circle),
            "square" => Ok(ShapeKind::Square),
            "triangle" => Ok(ShapeKind::Triangle),
            "diamond" => Ok(ShapeKind::Diamond),
            _ => Err(ParseShapeError(s.to_string())),
        }
    }
}

/// Position of an element inside a unit cell, `(0.5, 0.5)` being the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Center of the cell
    pub const CENTER: Position = Position { x: 0.5, y: 0.5 };

    /// Lower edge of the padded region elements are kept inside
    pub const PADDED_MIN: f64 = 0.3;

    /// Upper edge of the padded region elements are kept inside
    pub const PADDED_MAX: f64 = 0.7;

    /// Clamp into the padded sub-region so a drawn element never touches the cell border.
    pub fn clamped(self) -> Self {
        Position {
            x: self.x.clamp(Self::PADDED_MIN, Self::PADDED_MAX),
            y: self.y.clamp(Self::PADDED_MIN, Self::PADDED_MAX),
        }
    }

    pub fn is_center(&self) -> bool {
        *self == Self::CENTER
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

/// One drawable primitive of a puzzle cell or answer option.
///
/// `rotation` is stored unbounded; only visual comparisons reduce it by the
/// shape's symmetry period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub shape: ShapeKind,
    pub rotation: f64,
    pub color: String,
    pub opacity: f64,
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Position::is_center")]
    pub position: Position,
}

impl VisualElement {
    /// Create a centered element.
    pub fn new(
        shape: ShapeKind,
        rotation: f64,
        color: impl Into<String>,
        opacity: f64,
        scale: f64,
    ) -> Self {
        Self { shape, rotation, color: color.into(), opacity, scale, position: Position::CENTER }
    }

    /// Rotation reduced to the shape's symmetry period (always 0 for circles).
    pub fn visual_rotation(&self) -> f64 {
        match self.shape.symmetry_period() {
            None => 0.0,
            Some(period) => self.rotation.rem_euclid(period),
        }
    }

    /// Shorthand for [`are_visually_identical`].
    pub fn looks_like(&self, other: &VisualElement) -> bool {
        are_visually_identical(self, other)
    }
}

impl fmt::Display for VisualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rot={} color={} opacity={} scale={}",
            self.shape,
            format_degrees(self.rotation),
            self.color,
            self.opacity,
            self.scale
        )
    }
}

fn format_degrees(deg: f64) -> String {
    if deg.fract() == 0.0 {
        format!("{}°", deg as i64)
    } else {
        format!("{:.2}°", deg)
    }
}

/// Whether two rotations of `shape` look the same.
pub fn rotations_congruent(shape: ShapeKind, a: f64, b: f64) -> bool {
    match shape.symmetry_period() {
        None => true,
        Some(period) => {
            let diff = (a - b).rem_euclid(period);
            diff < ROTATION_EPSILON || period - diff < ROTATION_EPSILON
        }
    }
}

/// Whether two elements render identically.
///
/// Shape, color, opacity and scale must match exactly and the rotations must
/// be congruent modulo the shape's symmetry period. The relation is
/// reflexive and symmetric.
///
/// # Examples
///
/// ```
/// use ravenmatrix::element::{are_visually_identical, ShapeKind, VisualElement};
///
/// let a = VisualElement::new(ShapeKind::Square, 30.0, "#2563eb", 1.0, 1.0);
/// let b = VisualElement::new(ShapeKind::Square, 120.0, "#2563eb", 1.0, 1.0);
/// assert!(are_visually_identical(&a, &b));
/// ```
pub fn are_visually_identical(a: &VisualElement, b: &VisualElement) -> bool {
    a.shape == b.shape
        && a.color == b.color
        && a.opacity == b.opacity
        && a.scale == b.scale
        && rotations_congruent(a.shape, a.rotation, b.rotation)
}
