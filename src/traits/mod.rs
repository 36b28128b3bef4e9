//! Trait definitions for resource operations.
//!
//! Each resource type implements the traits it supports, encapsulating
//! path and error-mapping differences in the implementations.

mod create;
mod delete;
mod get;
mod list;
mod update;

pub use create::Create;
pub use delete::Delete;
pub use get::Get;
pub use list::{List, ListSource};
pub use update::Update;
