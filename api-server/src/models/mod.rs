//! Request and response models

pub mod predict;
pub mod schema;

pub use predict::*;
pub use schema::*;
