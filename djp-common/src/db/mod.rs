//! Database models and queries

pub mod assignments;
pub mod availability;
pub mod init;
pub mod migrations;
pub mod models;
pub mod performers;
pub mod settings;

pub use init::*;
pub use migrations::*;
pub use models::*;
