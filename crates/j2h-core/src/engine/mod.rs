//! Pipeline orchestration over configured datasets.

mod pipeline;

pub use pipeline::{
    apply_transform, build_table_spec, DatasetOutcome, DatasetStatus, Pipeline,
    RegistrationOutcome,
};
