pub mod huggingface;

pub use huggingface::HuggingFaceCaptionProvider;
