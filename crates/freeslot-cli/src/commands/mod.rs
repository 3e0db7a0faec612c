pub mod common;
pub mod expand;
pub mod find;
pub mod list;
