//! Device inventory service: a JSON API over a single device table with
//! search, paging, CSV import/export and per-type/per-team counts.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod transfer;
