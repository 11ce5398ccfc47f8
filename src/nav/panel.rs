//! `NavPanel`: one navigation panel instance and everything it owns.
//!
//! The panel holds its markup, the tree-state store, the bound handlers and
//! the population generation counters. Nothing is process-global: a panel is
//! created at mount and dropped at unmount.
//!
//! Lifecycle: [`NavPanel::mount`] restores persisted state onto the markup,
//! binds handlers, and highlights the active path; [`NavPanel::init`] also
//! runs auto-population. Both are no-ops on an already bound panel.

use std::sync::{mpsc, Arc};

use crate::content::discovery::anchor_hrefs;
use crate::content::paths::dir_path;
use crate::dom::serialize::to_html;
use crate::dom::{DomNode, NodePath};
use crate::engine::ContentEngine;
use crate::nav::highlight::{clear_active, enclosing_folders, find_active, mark_active, ActiveMatch};
use crate::nav::populate::{
    build_section, replace_section_children, section_dir, Generations, PopulationJob,
    PopulationResult, SECTION_ATTR,
};
use crate::nav::state::TreeStateStore;
use crate::nav::tree::{self, folders, is_expanded, own_row, twisty_path, Folder, TreeNode};

/// Marker set on the panel root by the first bind.
pub const BOUND_ATTR: &str = "data-nav-bound";
/// Marker set on each folder once its handlers are bound.
const HANDLERS_ATTR: &str = "data-nav-handlers";
const COLLAPSED_CLASS: &str = "collapsed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Click on the folder's `.twisty` button.
    TwistyClick,
    /// Key press while the folder's row is focused.
    RowKeydown,
}

/// A handler attached to one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub folder: String,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowRight,
    ArrowLeft,
    Other,
}

/// Interaction delivered to the panel. Folder events name the folder key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    TwistyClick(String),
    RowKey(String, NavKey),
    CollapseAll,
    ExpandAll,
    ToggleSidebar,
}

pub struct NavPanel {
    root: DomNode,
    location: String,
    engine: Arc<ContentEngine>,
    store: TreeStateStore,
    bindings: Vec<Binding>,
    generations: Generations,
    page_hrefs: Vec<String>,
    pending: Vec<mpsc::Receiver<PopulationResult>>,
}

impl NavPanel {
    pub fn new(
        root: DomNode,
        location: impl Into<String>,
        engine: Arc<ContentEngine>,
        store: TreeStateStore,
    ) -> Self {
        Self {
            root,
            location: location.into(),
            engine,
            store,
            bindings: Vec::new(),
            generations: Generations::default(),
            page_hrefs: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Anchors of the host page outside the panel, for the last discovery fallback.
    pub fn with_page_anchors(mut self, hrefs: Vec<String>) -> Self {
        self.page_hrefs = hrefs;
        self
    }

    pub fn root(&self) -> &DomNode {
        &self.root
    }

    pub fn to_html(&self) -> String {
        to_html(&self.root)
    }

    pub fn outline(&self) -> Vec<TreeNode> {
        tree::outline(&self.root)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn engine(&self) -> &Arc<ContentEngine> {
        &self.engine
    }

    pub fn store(&self) -> &TreeStateStore {
        &self.store
    }

    pub fn handler_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_bound(&self) -> bool {
        self.root.attr(BOUND_ATTR) == Some("true")
    }

    pub fn folders(&self) -> Vec<Folder> {
        folders(&self.root)
    }

    // ─── Mount ───────────────────────────────────────────────────────────────

    /// Restore, bind and highlight. Returns `false` if already bound.
    pub fn mount(&mut self) -> bool {
        if self.is_bound() {
            log::debug!("panel already bound");
            return false;
        }
        self.restore();
        self.bind_new();
        self.root.set_attr(BOUND_ATTR, "true");
        self.highlight_active();
        true
    }

    /// [`NavPanel::mount`] followed by synchronous population of every section.
    pub fn init(&mut self) -> bool {
        if !self.mount() {
            return false;
        }
        self.populate_all();
        true
    }

    /// Reflect stored state (or each folder's declared default) onto the markup.
    fn restore(&mut self) {
        self.reflect_sidebar();
        for folder in folders(&self.root) {
            let open = self.store.is_expanded(&folder.key, folder.start_open);
            if let Some(node) = self.root.at_mut(&folder.path) {
                tree::set_expanded(node, open);
            }
        }
    }

    /// Bind handlers on folders that have none yet.
    fn bind_new(&mut self) -> usize {
        let mut added = 0;
        for folder in folders(&self.root) {
            let Some(node) = self.root.at_mut(&folder.path) else {
                continue;
            };
            if node.attr(HANDLERS_ATTR) == Some("true") {
                continue;
            }
            node.set_attr(HANDLERS_ATTR, "true");
            if twisty_path(node).is_some() {
                self.bindings.push(Binding {
                    folder: folder.key.clone(),
                    trigger: Trigger::TwistyClick,
                });
                added += 1;
            }
            if own_row(node).is_some() {
                self.bindings.push(Binding {
                    folder: folder.key,
                    trigger: Trigger::RowKeydown,
                });
                added += 1;
            }
        }
        added
    }

    /// Drop handlers whose folder left the markup.
    fn prune_bindings(&mut self) {
        let live: Vec<String> = folders(&self.root).into_iter().map(|f| f.key).collect();
        self.bindings.retain(|b| live.contains(&b.folder));
    }

    fn has_binding(&self, key: &str, trigger: Trigger) -> bool {
        self.bindings
            .iter()
            .any(|b| b.folder == key && b.trigger == trigger)
    }

    // ─── Tree state ──────────────────────────────────────────────────────────

    fn folder(&self, key: &str) -> Option<Folder> {
        folders(&self.root).into_iter().find(|f| f.key == key)
    }

    pub fn is_folder_expanded(&self, key: &str) -> Option<bool> {
        let folder = self.folder(key)?;
        self.root.at(&folder.path).map(is_expanded)
    }

    fn set_folder(&mut self, folder: &Folder, open: bool) {
        if let Some(node) = self.root.at_mut(&folder.path) {
            tree::set_expanded(node, open);
        }
        self.store.set_expanded(&folder.key, open);
    }

    /// Flip one folder. Returns `false` for an unknown key.
    pub fn toggle(&mut self, key: &str) -> bool {
        match self.folder(key) {
            Some(folder) => {
                let open = self.root.at(&folder.path).map(is_expanded).unwrap_or(false);
                self.set_folder(&folder, !open);
                true
            }
            None => false,
        }
    }

    pub fn expand(&mut self, key: &str) -> bool {
        match self.folder(key) {
            Some(folder) => {
                self.set_folder(&folder, true);
                true
            }
            None => false,
        }
    }

    pub fn collapse(&mut self, key: &str) -> bool {
        match self.folder(key) {
            Some(folder) => {
                self.set_folder(&folder, false);
                true
            }
            None => false,
        }
    }

    fn set_all(&mut self, open: bool) {
        let all = folders(&self.root);
        for folder in &all {
            if let Some(node) = self.root.at_mut(&folder.path) {
                tree::set_expanded(node, open);
            }
        }
        self.store.set_all(all.iter().map(|f| f.key.as_str()), open);
    }

    pub fn collapse_all(&mut self) {
        self.set_all(false);
    }

    pub fn expand_all(&mut self) {
        self.set_all(true);
    }

    fn reflect_sidebar(&mut self) {
        if self.store.sidebar_collapsed() {
            self.root.add_class(COLLAPSED_CLASS);
        } else {
            self.root.remove_class(COLLAPSED_CLASS);
        }
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        self.store.set_sidebar_collapsed(collapsed);
        self.reflect_sidebar();
    }

    pub fn toggle_sidebar(&mut self) {
        let collapsed = !self.store.sidebar_collapsed();
        self.set_sidebar_collapsed(collapsed);
    }

    /// Route an interaction. Folder events only act through a bound handler.
    pub fn dispatch(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::TwistyClick(key) => {
                self.has_binding(&key, Trigger::TwistyClick) && self.toggle(&key)
            }
            UiEvent::RowKey(key, NavKey::ArrowRight) => {
                self.has_binding(&key, Trigger::RowKeydown) && self.expand(&key)
            }
            UiEvent::RowKey(key, NavKey::ArrowLeft) => {
                self.has_binding(&key, Trigger::RowKeydown) && self.collapse(&key)
            }
            UiEvent::RowKey(_, NavKey::Other) => false,
            UiEvent::CollapseAll => {
                self.collapse_all();
                true
            }
            UiEvent::ExpandAll => {
                self.expand_all();
                true
            }
            UiEvent::ToggleSidebar => {
                self.toggle_sidebar();
                true
            }
        }
    }

    // ─── Active path ─────────────────────────────────────────────────────────

    /// Highlight the link for the current location and show every folder
    /// enclosing it, regardless of stored preferences. The forced expansion is
    /// visual only; stored preferences are left as the user set them.
    pub fn highlight_active(&mut self) -> Option<ActiveMatch> {
        clear_active(&mut self.root);
        let found = find_active(&self.root, &self.location)?;
        mark_active(&mut self.root, &found.link);

        for path in enclosing_folders(&self.root, &found.link) {
            if let Some(node) = self.root.at_mut(&path) {
                tree::set_expanded(node, true);
            }
        }
        log::debug!("active link {} (exact: {})", found.target, found.exact);
        Some(found)
    }

    // ─── Population ──────────────────────────────────────────────────────────

    fn section_nodes(&self) -> Vec<NodePath> {
        self.root.find_all(|n| n.attributes.contains_key(SECTION_ATTR))
    }

    /// Base directories of every section awaiting population, in document order.
    pub fn sections(&self) -> Vec<String> {
        self.section_nodes()
            .iter()
            .filter_map(|p| self.root.at(p).and_then(section_dir))
            .collect()
    }

    fn section_path(&self, section: &str) -> Option<NodePath> {
        self.section_nodes()
            .into_iter()
            .find(|p| self.root.at(p).and_then(section_dir).as_deref() == Some(section))
    }

    /// Start a cycle for `section`; any earlier cycle for it becomes stale.
    pub fn begin_population(&mut self, section: &str) -> PopulationJob {
        let section = dir_path(section);
        let generation = self.generations.begin(&section);
        let mut page_hrefs = self.page_hrefs.clone();
        page_hrefs.extend(anchor_hrefs(&self.root));
        PopulationJob {
            section,
            generation,
            page_hrefs,
        }
    }

    /// Write a finished cycle into the markup. Stale or empty results leave
    /// the section untouched.
    pub fn apply_population(&mut self, result: PopulationResult) -> bool {
        if !self.generations.is_current(&result.section, result.generation) {
            log::debug!(
                "discarding stale population of {} (generation {})",
                result.section,
                result.generation
            );
            return false;
        }
        if result.listing.is_empty() {
            log::debug!("nothing discovered for {}, keeping placeholder", result.section);
            return false;
        }
        let Some(path) = self.section_path(&result.section) else {
            log::debug!("section {} no longer in panel", result.section);
            return false;
        };

        let built = build_section(&result.section, &result.listing.groups);
        if let Some(node) = self.root.at_mut(&path) {
            replace_section_children(node, built);
        }
        self.prune_bindings();
        self.restore();
        let added = self.bind_new();
        self.highlight_active();
        log::info!(
            "populated {}: {} items in {} categories ({} handlers bound)",
            result.section,
            result.listing.items.len(),
            result.listing.groups.len(),
            added
        );
        true
    }

    pub fn populate_section(&mut self, section: &str) -> bool {
        let job = self.begin_population(section);
        let result = job.run(&self.engine);
        self.apply_population(result)
    }

    /// Populate every section in turn; returns how many were filled. An empty
    /// section does not affect its siblings.
    pub fn populate_all(&mut self) -> usize {
        self.sections()
            .iter()
            .filter(|s| self.populate_section(s))
            .count()
    }

    /// Run every section's cycle on a background thread. Results are applied
    /// by [`NavPanel::poll_population`] or [`NavPanel::wait_population`].
    pub fn spawn_population(&mut self) -> usize {
        let sections = self.sections();
        for section in &sections {
            let job = self.begin_population(section);
            let engine = Arc::clone(&self.engine);
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || {
                let result = job.run(&engine);
                let _ = tx.send(result);
            });
            self.pending.push(rx);
        }
        sections.len()
    }

    /// Apply whichever background cycles have finished; returns how many
    /// wrote into the panel.
    pub fn poll_population(&mut self) -> usize {
        let mut applied = 0;
        for rx in std::mem::take(&mut self.pending) {
            match rx.try_recv() {
                Ok(result) => {
                    if self.apply_population(result) {
                        applied += 1;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => self.pending.push(rx),
                Err(mpsc::TryRecvError::Disconnected) => {}
            }
        }
        applied
    }

    /// Block until every background cycle has finished and apply them.
    pub fn wait_population(&mut self) -> usize {
        let mut applied = 0;
        for rx in std::mem::take(&mut self.pending) {
            if let Ok(result) = rx.recv() {
                if self.apply_population(result) {
                    applied += 1;
                }
            }
        }
        applied
    }

    pub fn has_pending_population(&self) -> bool {
        !self.pending.is_empty()
    }
}
