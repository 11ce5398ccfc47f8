pub mod pipeline;

pub use pipeline::{ContentEngine, Listing};
