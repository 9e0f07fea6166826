pub mod core;
pub mod queries;
pub mod stats;
pub mod upload;
