pub mod lookup;
pub mod nutrition;

pub use lookup::{FoodRecord, LookupOutcome, QueryRelaxationLookup};
