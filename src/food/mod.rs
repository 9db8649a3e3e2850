pub mod analysis;
pub mod api;
pub mod config;

pub use analysis::{LookupOutcome, QueryRelaxationLookup};
pub use config::FoodConfig;
