//! Google Cloud provider support for Cloudrail
//!
//! Contributes the Google error families (HTTP library, gRPC, base HTTP
//! service) to the core classifier, plus long-running-operation polling and
//! the notebook instance wait target set.

pub mod classify;
pub mod lro;
pub mod notebook;

pub use classify::{GoogleApiError, grpc_to_http, rules};
pub use lro::{poll_operation, wait_for_operation};
pub use notebook::{
    NotebookStateTarget, SUPPORTED_NOTEBOOK_STATES, default_notebook_wait,
    wait_for_notebook_state,
};
