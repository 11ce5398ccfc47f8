//! The navigation panel: folder model, persisted tree state, active-path
//! highlighting, section auto-population and the controller tying them together.

pub mod highlight;
pub mod markup;
pub mod panel;
pub mod populate;
pub mod state;
pub mod tree;

pub use markup::{load_panel, panel_from_markup};
pub use panel::{Binding, NavKey, NavPanel, Trigger, UiEvent};
pub use state::{FileStore, KeyValueStore, MemoryStore, StorageError, TreeState, TreeStateStore};
pub use tree::{Folder, NodeKind, TreeNode};
