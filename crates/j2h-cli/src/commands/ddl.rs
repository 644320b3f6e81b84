//! Ddl command implementation.
//!
//! Prints the registration DDL a pipeline run would issue, derived from the
//! actual transformed schema of each registering dataset.

use anyhow::{bail, Result};
use j2h_core::dataset::json;
use j2h_core::engine::{apply_transform, build_table_spec};
use j2h_core::transform::flatten_dataset;
use j2h_core::Config;

/// Print registration DDL for configured tables.
pub fn run(config: Config, dataset: Option<String>) -> Result<()> {
    let mut printed = 0;

    for descriptor in &config.datasets {
        if let Some(name) = &dataset {
            if &descriptor.name != name {
                continue;
            }
        }
        let Some(transform) = &descriptor.transform else {
            continue;
        };
        let Some(register) = &transform.register else {
            continue;
        };

        let raw = json::read_path(&descriptor.source)?;
        let flat = flatten_dataset(&raw)?;
        let transformed = apply_transform(&flat, transform)?;

        let out_dir = config.output.transformed_dataset_dir(&descriptor.name);
        let spec = build_table_spec(&config, register, &transformed.schema, &out_dir);

        println!("-- {}", descriptor.name);
        println!("{};", spec.to_ddl());
        printed += 1;
    }

    if printed == 0 {
        bail!("No dataset with a [datasets.transform.register] section matched");
    }
    Ok(())
}
