mod accounts;
pub mod db;
pub mod models;
mod sweets;
mod tables;

pub use db::{Database, DatabaseError};
pub use sweets::Modified;
pub use tables::*;
