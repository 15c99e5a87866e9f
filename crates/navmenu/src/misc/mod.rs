pub mod helpers;

pub use helpers::{capitalize_word, expand_tilde};
