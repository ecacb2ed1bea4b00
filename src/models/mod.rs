pub mod paper;

pub use paper::{normalize_identifier, PaperRecord};
