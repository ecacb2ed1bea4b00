pub mod logging;

pub use logging::{take_chars, truncate_text};
