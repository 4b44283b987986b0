//! Parameter catalog and per-level complexity bounds
//!
//! The [`Catalog`] enumerates every value a puzzle may draw from, and the
//! [`ComplexityMatrix`] limits how many of them each difficulty level may use.
//! Both are plain values handed to the generator at construction.

use rand::Rng;
use std::collections::{BTreeMap, HashSet};

use crate::element::{ShapeKind, VisualElement};

/// Enumerated visual parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub shapes: Vec<ShapeKind>,
    pub rotations: Vec<f64>,
    pub colors: Vec<String>,
    pub opacities: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Catalog {
    /// The catalog shipped with the reasoning test.
    pub fn builtin() -> Self {
        Self {
            shapes: ShapeKind::ALL.to_vec(),
            rotations: vec![
                0.0, 30.0, 45.0, 60.0, 90.0, 120.0, 135.0, 150.0, 180.0, 210.0, 240.0, 270.0,
                300.0, 330.0,
            ],
            colors: ["#2563eb", "#dc2626", "#059669", "#7c2d12", "#6b21a8", "#0f766e"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            opacities: vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3],
            scales: vec![0.6, 0.8, 1.0, 1.2, 1.4, 1.6],
        }
    }

    /// Names of empty parameter families. A usable catalog returns nothing.
    pub fn empty_families(&self) -> Vec<&'static str> {
        let mut empty = Vec::new();
        if self.shapes.is_empty() {
            empty.push("shapes");
        }
        if self.rotations.is_empty() {
            empty.push("rotations");
        }
        if self.colors.is_empty() {
            empty.push("colors");
        }
        if self.opacities.is_empty() {
            empty.push("opacities");
        }
        if self.scales.is_empty() {
            empty.push("scales");
        }
        empty
    }

    /// Index of `shape` in the shape list.
    pub fn shape_index(&self, shape: ShapeKind) -> Option<usize> {
        self.shapes.iter().position(|s| *s == shape)
    }

    /// Draw every parameter uniformly from the full catalog.
    ///
    /// Every family must be non-empty; [`Catalog::empty_families`] checks that.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> VisualElement {
        VisualElement::new(
            self.shapes[rng.gen_range(0..self.shapes.len())],
            self.rotations[rng.gen_range(0..self.rotations.len())],
            self.colors[rng.gen_range(0..self.colors.len())].clone(),
            self.opacities[rng.gen_range(0..self.opacities.len())],
            self.scales[rng.gen_range(0..self.scales.len())],
        )
    }

    /// Number of visually distinct elements [`Catalog::random_element`] can produce.
    pub fn distinct_combinations(&self) -> usize {
        let colors: HashSet<&str> = self.colors.iter().map(String::as_str).collect();
        let opacities = distinct_floats(&self.opacities);
        let scales = distinct_floats(&self.scales);

        let shapes: HashSet<ShapeKind> = self.shapes.iter().copied().collect();
        let looks: usize = shapes
            .into_iter()
            .map(|shape| {
                let reduced: Vec<f64> = self
                    .rotations
                    .iter()
                    .map(|r| VisualElement::new(shape, *r, "", 1.0, 1.0).visual_rotation())
                    .collect();
                distinct_rotations(shape, &reduced)
            })
            .sum();

        looks * colors.len() * opacities * scales
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn distinct_floats(values: &[f64]) -> usize {
    let bits: HashSet<u64> = values.iter().map(|v| v.to_bits()).collect();
    bits.len()
}

fn distinct_rotations(shape: ShapeKind, reduced: &[f64]) -> usize {
    let mut seen: Vec<f64> = Vec::new();
    for r in reduced {
        if !seen.iter().any(|s| crate::element::rotations_congruent(shape, *s, *r)) {
            seen.push(*r);
        }
    }
    seen.len()
}

/// How many distinct values of each family a level may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBounds {
    pub shapes: usize,
    pub rotations: usize,
    pub colors: usize,
    pub opacities: usize,
    pub scales: usize,
}

impl LevelBounds {
    pub const fn new(
        shapes: usize,
        rotations: usize,
        colors: usize,
        opacities: usize,
        scales: usize,
    ) -> Self {
        Self { shapes, rotations, colors, opacities, scales }
    }
}

/// Levels at which individual formula features switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThresholds {
    /// From this level the rotation index advances two steps per diagonal
    pub rotation_stride_from: u32,
    /// From this level opacity varies across the grid
    pub opacity_from: u32,
    /// From this level scale varies across the grid
    pub scale_from: u32,
    /// Levels strictly above this use trigonometric derivation
    pub trigonometric_above: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self { rotation_stride_from: 5, opacity_from: 6, scale_from: 7, trigonometric_above: 10 }
    }
}

/// Trigonometric perturbation applied above the linear threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrigVariant {
    Sine,
    Cosine,
    Tangent,
}

/// Per-level bounds table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityMatrix {
    levels: BTreeMap<u32, LevelBounds>,
    pub thresholds: LevelThresholds,
}

impl ComplexityMatrix {
    /// Build from explicit rows.
    pub fn new(
        rows: impl IntoIterator<Item = (u32, LevelBounds)>,
        thresholds: LevelThresholds,
    ) -> Self {
        Self { levels: rows.into_iter().collect(), thresholds }
    }

    /// The 13-level table of the reasoning test.
    pub fn builtin() -> Self {
        Self::new(
            [
                (1, LevelBounds::new(2, 1, 1, 1, 1)),
                (2, LevelBounds::new(2, 2, 1, 1, 1)),
                (3, LevelBounds::new(3, 2, 2, 1, 1)),
                (4, LevelBounds::new(3, 4, 2, 1, 1)),
                (5, LevelBounds::new(3, 4, 3, 1, 1)),
                (6, LevelBounds::new(4, 4, 3, 2, 1)),
                (7, LevelBounds::new(4, 6, 3, 2, 2)),
                (8, LevelBounds::new(4, 8, 4, 3, 2)),
                (9, LevelBounds::new(4, 8, 4, 4, 3)),
                (10, LevelBounds::new(4, 10, 4, 4, 3)),
                (11, LevelBounds::new(4, 12, 5, 6, 4)),
                (12, LevelBounds::new(4, 13, 6, 7, 5)),
                (13, LevelBounds::new(4, 14, 6, 8, 6)),
            ],
            LevelThresholds::default(),
        )
    }

    pub fn bounds(&self, level: u32) -> Option<LevelBounds> {
        self.levels.get(&level).copied()
    }

    pub fn contains(&self, level: u32) -> bool {
        self.levels.contains_key(&level)
    }

    pub fn min_level(&self) -> Option<u32> {
        self.levels.keys().next().copied()
    }

    pub fn max_level(&self) -> Option<u32> {
        self.levels.keys().next_back().copied()
    }

    /// Configured levels in ascending order
    pub fn levels(&self) -> impl Iterator<Item = (u32, LevelBounds)> + '_ {
        self.levels.iter().map(|(level, bounds)| (*level, *bounds))
    }

    pub fn is_trigonometric(&self, level: u32) -> bool {
        level > self.thresholds.trigonometric_above
    }

    /// Which perturbation a trigonometric level uses, `None` for linear levels.
    pub fn trig_variant(&self, level: u32) -> Option<TrigVariant> {
        if !self.is_trigonometric(level) {
            return None;
        }
        Some(match level - self.thresholds.trigonometric_above - 1 {
            0 => TrigVariant::Sine,
            1 => TrigVariant::Cosine,
            _ => TrigVariant::Tangent,
        })
    }

    /// Rows whose bounds are zero or exceed what `catalog` offers.
    pub fn check_against(&self, catalog: &Catalog) -> Vec<String> {
        let mut problems = Vec::new();
        for (level, b) in self.levels() {
            let families = [
                ("shapes", b.shapes, catalog.shapes.len()),
                ("rotations", b.rotations, catalog.rotations.len()),
                ("colors", b.colors, catalog.colors.len()),
                ("opacities", b.opacities, catalog.opacities.len()),
                ("scales", b.scales, catalog.scales.len()),
            ];
            for (name, bound, available) in families {
                if bound == 0 || bound > available {
                    problems.push(format!(
                        "level {}: {} bound {} outside 1..={}",
                        level, name, bound, available
                    ));
                }
            }
        }
        problems
    }
}

impl Default for ComplexityMatrix {
    fn default() -> Self {
        Self::builtin()
    }
}
