mod comics;
pub mod db;
pub mod models;
mod tables;
mod tags;

pub use db::{Database, DatabaseError};
pub use tables::*;
