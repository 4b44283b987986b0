//! Geometric pattern descriptors and the transforms they combine
//!
//! This is the reference catalog for position-based puzzles: each pattern
//! lists the transforms it is compatible with, and applying a pattern moves
//! an element inside its cell while keeping it clear of the cell border.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::element::VisualElement;

/// Smallest scale a transform may produce
pub const MIN_SCALE: f64 = 0.6;

/// Largest scale a transform may produce
pub const MAX_SCALE: f64 = 1.6;

/// A single geometric transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Rotate,
    Scale,
    Translate,
    Mirror,
    Shear,
}

impl TransformKind {
    pub const ALL: [TransformKind; 5] = [
        TransformKind::Rotate,
        TransformKind::Scale,
        TransformKind::Translate,
        TransformKind::Mirror,
        TransformKind::Shear,
    ];

    /// Apply the transform in place.
    ///
    /// Rotate adds 45°, scale grows by 10%, translate shifts by 5% of the cell
    /// on both axes, mirror reflects horizontally around the cell center and
    /// shear nudges by 2%.
    pub fn apply(self, element: &mut VisualElement) {
        match self {
            TransformKind::Rotate => element.rotation += 45.0,
            TransformKind::Scale => element.scale *= 1.1,
            TransformKind::Translate => {
                element.position.x += 0.05;
                element.position.y += 0.05;
            }
            TransformKind::Mirror => element.position.x = 1.0 - element.position.x,
            TransformKind::Shear => {
                element.position.x += 0.02;
                element.position.y += 0.02;
            }
        }
        element.position = element.position.clamped();
        element.scale = element.scale.clamp(MIN_SCALE, MAX_SCALE);
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformKind::Rotate => "rotate",
            TransformKind::Scale => "scale",
            TransformKind::Translate => "translate",
            TransformKind::Mirror => "mirror",
            TransformKind::Shear => "shear",
        };
        f.write_str(name)
    }
}

/// A named combination of compatible transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternDescriptor {
    pub id: &'static str,
    pub compatible: &'static [TransformKind],
    pub description: &'static str,
}

const PATTERNS: &[PatternDescriptor] = &[
    PatternDescriptor {
        id: "pattern1",
        compatible: &[TransformKind::Rotate, TransformKind::Scale],
        description: "Uniform rotation and scale",
    },
    PatternDescriptor {
        id: "pattern2",
        compatible: &[TransformKind::Translate, TransformKind::Mirror],
        description: "Translation and mirroring",
    },
    PatternDescriptor {
        id: "pattern3",
        compatible: &[TransformKind::Rotate, TransformKind::Translate],
        description: "Combined rotation and translation",
    },
    PatternDescriptor {
        id: "pattern4",
        compatible: &[TransformKind::Scale, TransformKind::Mirror],
        description: "Scale and mirroring",
    },
    PatternDescriptor {
        id: "pattern5",
        compatible: &[TransformKind::Rotate, TransformKind::Scale, TransformKind::Translate],
        description: "Rotation, scale and translation",
    },
];

/// All built-in pattern descriptors.
pub fn builtin_patterns() -> &'static [PatternDescriptor] {
    PATTERNS
}

/// A pattern with the transforms picked for one puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPattern {
    pub pattern: PatternDescriptor,
    pub transforms: Vec<TransformKind>,
}

/// Pick `count` distinct patterns and up to two of each one's compatible transforms.
pub fn select_patterns<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<SelectedPattern> {
    PATTERNS
        .choose_multiple(rng, count.min(PATTERNS.len()))
        .map(|pattern| SelectedPattern {
            pattern: *pattern,
            transforms: pattern.compatible.choose_multiple(rng, 2).copied().collect(),
        })
        .collect()
}

/// Apply every selected transform in order, returning the moved element.
pub fn apply_patterns(element: &VisualElement, patterns: &[SelectedPattern]) -> VisualElement {
    let mut out = element.clone();
    for selected in patterns {
        for transform in &selected.transforms {
            transform.apply(&mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Position, ShapeKind};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn base() -> VisualElement {
        VisualElement::new(ShapeKind::Square, 0.0, "#1e88e5", 1.0, 1.0)
    }

    #[test]
    fn test_catalog_contents() {
        let patterns = builtin_patterns();
        assert_eq!(patterns.len(), 5);
        assert!(patterns.iter().all(|p| !p.compatible.is_empty()));
        // shear is defined but no pattern is compatible with it
        assert!(patterns.iter().all(|p| !p.compatible.contains(&TransformKind::Shear)));
    }

    #[test]
    fn test_mirror_reflects_around_center() {
        let mut e = base();
        e.position = Position { x: 0.4, y: 0.5 };
        TransformKind::Mirror.apply(&mut e);
        assert!((e.position.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_translate_stays_in_padded_region() {
        let mut e = base();
        for _ in 0..20 {
            TransformKind::Translate.apply(&mut e);
        }
        assert_eq!(e.position, Position { x: Position::PADDED_MAX, y: Position::PADDED_MAX });
    }

    #[test]
    fn test_scale_is_capped() {
        let mut e = base();
        for _ in 0..20 {
            TransformKind::Scale.apply(&mut e);
        }
        assert_eq!(e.scale, MAX_SCALE);
    }

    #[test]
    fn test_select_patterns_respects_compatibility() {
        let mut rng = SmallRng::seed_from_u64(3);
        let selected = select_patterns(3, &mut rng);
        assert_eq!(selected.len(), 3);
        for s in &selected {
            assert!(s.transforms.len() <= 2);
            assert!(s.transforms.iter().all(|t| s.pattern.compatible.contains(t)));
        }
        let ids: std::collections::HashSet<_> = selected.iter().map(|s| s.pattern.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_select_more_than_available() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(select_patterns(10, &mut rng).len(), 5);
    }

    #[test]
    fn test_apply_patterns_rotates() {
        let selected = vec![SelectedPattern {
            pattern: builtin_patterns()[0],
            transforms: vec![TransformKind::Rotate, TransformKind::Rotate],
        }];
        let moved = apply_patterns(&base(), &selected);
        assert_eq!(moved.rotation, 90.0);
        assert_eq!(base().rotation, 0.0);
    }
}
