//! Integration tests for puzzle generation and visual equivalence
//!
//! Exercises the public API the way a presentation layer would: generate,
//! inspect the grid, compare options.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use ravenmatrix::catalog::{Catalog, ComplexityMatrix};
use ravenmatrix::element::{are_visually_identical, ShapeKind, VisualElement};
use ravenmatrix::generator::{
    validate_matrix, GenerateError, GeneratorConfig, MatrixGenerator, ANSWER_CELL,
};

#[test]
fn test_no_two_options_look_alike_on_any_level() {
    let generator = MatrixGenerator::default();
    for level in 1..=13 {
        for seed in 0..30 {
            let puzzle = generator
                .generate_matrix(level, &mut SmallRng::seed_from_u64(seed))
                .unwrap_or_else(|e| panic!("level {} seed {}: {}", level, seed, e));
            for (i, a) in puzzle.options.iter().enumerate() {
                for b in &puzzle.options[i + 1..] {
                    assert!(
                        !are_visually_identical(&a.element, &b.element),
                        "level {} seed {}: {} looks like {}",
                        level,
                        seed,
                        a.element,
                        b.element
                    );
                }
            }
            assert!(validate_matrix(&puzzle).is_ok());
        }
    }
}

#[test]
fn test_grid_is_independent_of_rng() {
    // Only options and their order are random; the grid is a pure function of the level
    let generator = MatrixGenerator::default();
    for level in [2, 6, 11] {
        let a = generator.generate_matrix(level, &mut SmallRng::seed_from_u64(1)).unwrap();
        let b = generator.generate_matrix(level, &mut SmallRng::seed_from_u64(2)).unwrap();
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.correct_option().unwrap().element, b.correct_option().unwrap().element);
    }
}

#[test]
fn test_linear_levels_respect_bounds() {
    let generator = MatrixGenerator::default();
    let catalog = generator.catalog();
    for (level, bounds) in generator.complexity().levels().filter(|(l, _)| *l <= 10) {
        let puzzle = generator.generate_matrix(level, &mut SmallRng::seed_from_u64(0)).unwrap();
        for element in puzzle.cells.iter().flatten().flatten() {
            let shape = catalog.shape_index(element.shape).unwrap();
            assert!(shape < bounds.shapes, "level {}: shape {}", level, element.shape);
            let color = catalog.colors.iter().position(|c| *c == element.color).unwrap();
            assert!(color < bounds.colors, "level {}: color {}", level, element.color);
            let rotation = catalog.rotations.iter().position(|r| *r == element.rotation).unwrap();
            assert!(rotation < bounds.rotations, "level {}: rotation {}", level, element.rotation);
        }
    }
}

#[test]
fn test_answer_cell_is_blank() {
    let generator = MatrixGenerator::default();
    let puzzle = generator.generate_matrix(9, &mut SmallRng::seed_from_u64(4)).unwrap();
    assert!(puzzle.cell(ANSWER_CELL.0, ANSWER_CELL.1).is_none());
    assert_eq!(puzzle.filled_cells(), 8);
}

#[test]
fn test_equivalence_examples() {
    let square = |r| VisualElement::new(ShapeKind::Square, r, "#2563eb", 1.0, 1.0);
    assert!(are_visually_identical(&square(0.0), &square(90.0)));
    assert!(are_visually_identical(&square(-45.0), &square(45.0)));
    assert!(!are_visually_identical(&square(0.0), &square(45.0)));

    let triangle = |r| VisualElement::new(ShapeKind::Triangle, r, "#2563eb", 1.0, 1.0);
    assert!(are_visually_identical(&triangle(30.0), &triangle(150.0)));
    assert!(!are_visually_identical(&triangle(0.0), &triangle(90.0)));

    let circle = |r| VisualElement::new(ShapeKind::Circle, r, "#2563eb", 1.0, 1.0);
    assert!(are_visually_identical(&circle(0.0), &circle(137.0)));

    let mut faded = circle(0.0);
    faded.opacity = 0.9;
    assert!(!are_visually_identical(&circle(0.0), &faded));
}

#[test]
fn test_custom_option_counts() {
    for option_count in [2, 4, 8] {
        let config = GeneratorConfig { option_count, ..Default::default() };
        let generator = MatrixGenerator::with_config(config).unwrap();
        let puzzle = generator.generate_matrix(8, &mut SmallRng::seed_from_u64(6)).unwrap();
        assert_eq!(puzzle.options.len(), option_count);
    }
}

#[test]
fn test_degenerate_catalog_is_an_error() {
    let catalog = Catalog {
        shapes: vec![ShapeKind::Circle],
        rotations: vec![0.0, 90.0, 180.0],
        colors: vec!["#000000".to_string()],
        opacities: vec![1.0],
        scales: vec![1.0],
    };
    let complexity = ComplexityMatrix::new(
        [(1, ravenmatrix::catalog::LevelBounds::new(1, 1, 1, 1, 1))],
        Default::default(),
    );
    let generator = MatrixGenerator::new(catalog, complexity, GeneratorConfig::default()).unwrap();
    let result = generator.generate_matrix(1, &mut SmallRng::seed_from_u64(0));
    assert_eq!(
        result.unwrap_err(),
        GenerateError::InsufficientDistinctOptions { level: 1, required: 6, found: 1 }
    );
}

#[test]
fn test_batch_matches_sequential_generation() {
    let generator = MatrixGenerator::default();
    let batch = generator.generate_batch(11, 5, 500);
    for (i, result) in batch.into_iter().enumerate() {
        let expected =
            generator.generate_matrix(11, &mut SmallRng::seed_from_u64(500 + i as u64)).unwrap();
        assert_eq!(result.unwrap(), expected);
    }
}
