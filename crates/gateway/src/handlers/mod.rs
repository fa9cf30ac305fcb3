//! API handlers module

pub mod health;
pub mod prompting;
pub mod research;
pub mod sources;
pub mod tools;
