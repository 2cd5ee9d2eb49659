//! Scriptorium: the data-access layer of a content-management system
//!
//! One generic [`orm::Model`] serves every content entity. Schemas declare their
//! columns once (`#[derive(Column)]`), filters and orderings compile into
//! parameterized SQL, and transactions hand out a distinct [`orm::TxHandle`].

// Lets `#[derive(Column)]` expand to `::scriptorium::…` paths inside this crate too
extern crate self as scriptorium;

pub mod config;
pub mod db;
pub mod entities;
pub mod logging;
pub mod orm;

pub use config::Config;
pub use db::Database;
pub use entities::Models;
