//! Catalog command implementation

use std::process::ExitCode;

use crate::patterns::{builtin_patterns, TransformKind};

use super::{Context, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the catalog command
pub fn run_catalog(ctx: &Context) -> ExitCode {
    let generator = match ctx.generator() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let complexity = generator.complexity();
    let catalog = generator.catalog();

    println!("Complexity levels:");
    println!("  level  shapes  rotations  colors  opacities  scales  mode");
    for (level, b) in complexity.levels() {
        let mode = match complexity.trig_variant(level) {
            Some(variant) => format!("{:?}", variant).to_lowercase(),
            None => "linear".to_string(),
        };
        println!(
            "  {:>5}  {:>6}  {:>9}  {:>6}  {:>9}  {:>6}  {}",
            level, b.shapes, b.rotations, b.colors, b.opacities, b.scales, mode
        );
    }

    println!();
    println!("Parameters:");
    let shapes: Vec<&str> = catalog.shapes.iter().map(|s| s.name()).collect();
    println!("  shapes:    {}", shapes.join(", "));
    println!("  rotations: {}", join_numbers(&catalog.rotations));
    println!("  colors:    {}", catalog.colors.join(", "));
    println!("  opacities: {}", join_numbers(&catalog.opacities));
    println!("  scales:    {}", join_numbers(&catalog.scales));
    println!("  distinct looks: {}", catalog.distinct_combinations());

    println!();
    println!("Patterns:");
    for pattern in builtin_patterns() {
        let transforms: Vec<String> = pattern.compatible.iter().map(|t| t.to_string()).collect();
        println!("  {:<9} {:<32} [{}]", pattern.id, pattern.description, transforms.join(", "));
    }
    let all: Vec<String> = TransformKind::ALL.iter().map(|t| t.to_string()).collect();
    println!("  transforms: {}", all.join(", "));

    ExitCode::from(EXIT_SUCCESS)
}

fn join_numbers(values: &[f64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}
