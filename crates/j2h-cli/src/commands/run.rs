//! Run command implementation.

use anyhow::{bail, Result};
use j2h_core::engine::{DatasetStatus, Pipeline, RegistrationOutcome};
use j2h_core::Config;
use tracing::info;

/// Run the conversion pipeline.
pub async fn run(mut config: Config, dataset: Option<String>) -> Result<()> {
    // Apply CLI override
    if let Some(name) = dataset {
        config.datasets.retain(|d| d.name == name);
        if config.datasets.is_empty() {
            bail!("No dataset named {:?} in configuration", name);
        }
    }

    info!(datasets = config.datasets.len(), "Starting conversion pipeline");

    let pipeline = Pipeline::new(config).await?;
    let outcomes = pipeline.run().await;

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.status {
            DatasetStatus::Completed {
                flat_rows,
                transformed_rows,
            } => {
                match transformed_rows {
                    Some(rows) => println!(
                        "{}: {} flat rows, {} transformed rows",
                        outcome.dataset, flat_rows, rows
                    ),
                    None => println!("{}: {} flat rows", outcome.dataset, flat_rows),
                }
                match &outcome.registration {
                    Some(RegistrationOutcome::Registered { table }) => {
                        println!("{}: registered as {}", outcome.dataset, table);
                    }
                    Some(RegistrationOutcome::Failed { table, message }) => {
                        println!(
                            "{}: registration of {} failed ({}); data remains queryable",
                            outcome.dataset, table, message
                        );
                    }
                    None => {}
                }
            }
            DatasetStatus::Failed { kind, message } => {
                failures += 1;
                println!("{}: failed [{}] {}", outcome.dataset, kind, message);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} datasets failed", failures, outcomes.len());
    }

    info!("Conversion pipeline finished");
    Ok(())
}
