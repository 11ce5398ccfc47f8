//! Content discovery and hierarchical navigation state for static sites.
//!
//! `content` finds and describes the pages under a directory, `engine` runs
//! that pipeline end to end, and `nav` drives a navigation panel over the
//! results: persisted folder state, active-path highlighting, and
//! auto-populated sections.

pub mod config;
pub mod content;
pub mod dom;
pub mod engine;
pub mod nav;
pub mod net;

pub use config::NavConfig;
pub use content::ContentItem;
pub use engine::{ContentEngine, Listing};
pub use nav::NavPanel;
