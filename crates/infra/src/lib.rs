//! Infrastructure layer: tabular store adapters, ledger persistence, report
//! snapshot, session registry and configuration.

pub mod config;
pub mod ledger;
pub mod report;
pub mod sessions;
pub mod table_store;
