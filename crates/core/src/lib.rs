#![forbid(unsafe_code)]

pub mod flashcards;
pub mod model;
pub mod prompts;
pub mod quiz;
pub mod summary;
pub mod time;

pub use time::Clock;
