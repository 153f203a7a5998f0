pub mod config;
pub mod error;
pub mod extract;
pub mod journal;
pub mod load;
pub mod pipeline;
pub mod query;
pub mod transform;
