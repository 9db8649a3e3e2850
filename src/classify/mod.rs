pub mod keywords;
pub mod orchestrator;

pub use keywords::{KeywordConfirmer, GROCERY_KEYWORDS};
pub use orchestrator::{Classification, ClassificationOrchestrator, UNCONFIRMED_LABEL};
