//! bqddl engine - provisioning logic
//!
//! This crate wires configuration, DDL discovery and a warehouse adapter
//! into a single provisioning run:
//! - Existence checks
//! - Table creation
//! - Run reports

pub mod error;
pub mod provisioner;
pub mod report;

pub use error::ProvisionError;
pub use provisioner::Provisioner;
pub use report::{FileOutcome, FileReport, ProvisionReport, ReportSummary};
