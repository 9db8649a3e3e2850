pub mod google_vision;
pub mod huggingface;
pub mod traits;
pub mod utils;

pub use google_vision::GoogleVisionProvider;
pub use huggingface::HuggingFaceCaptionProvider;
pub use traits::ClassificationProvider;
