//! Preview command implementation.
//!
//! Prints a dataset's inferred schema and its first rows, before or after
//! flattening.

use anyhow::{bail, Result};
use j2h_core::dataset::{json, Dataset};
use j2h_core::transform::flatten_dataset;
use j2h_core::Config;

/// Show schema and head rows for one configured dataset.
pub fn run(config: Config, dataset: &str, limit: usize, flat: bool) -> Result<()> {
    let Some(descriptor) = config.datasets.iter().find(|d| d.name == dataset) else {
        bail!("No dataset named {:?} in configuration", dataset);
    };

    let loaded = json::read_path(&descriptor.source)?;
    let view = if flat {
        flatten_dataset(&loaded)?
    } else {
        loaded
    };

    print_schema(&view);
    print_head(&view, limit, &config.output.null_token);
    Ok(())
}

fn print_schema(dataset: &Dataset) {
    println!("schema ({} fields):", dataset.schema.len());
    for field in dataset.schema.fields() {
        println!("  {}: {}", field.name, field.field_type);
    }
}

fn print_head(dataset: &Dataset, limit: usize, null_token: &str) {
    println!(
        "rows ({} of {}):",
        dataset.head(limit).len(),
        dataset.row_count()
    );
    for record in dataset.head(limit) {
        let cells: Vec<String> = dataset
            .schema
            .fields()
            .iter()
            .map(|field| {
                let rendered = record
                    .get(&field.name)
                    .map(|v| v.render(null_token))
                    .unwrap_or_default();
                format!("{}={}", field.name, rendered)
            })
            .collect();
        println!("  {}", cells.join(", "));
    }
}
