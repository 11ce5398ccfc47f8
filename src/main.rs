use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use navtree::content::discovery::page_hrefs;
use navtree::nav::{load_panel, FileStore, NavKey, NavPanel, TreeStateStore, UiEvent};
use navtree::net::{Fetcher, LocalSite};
use navtree::{ContentEngine, NavConfig};

/// Discover site content and drive a navigation panel from the command line
#[derive(Parser)]
#[command(name = "navtree", version)]
#[command(about = "Content discovery and navigation tree state for static sites")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Site origin to fetch from (https:// is assumed when no scheme is given)
    #[arg(long, conflicts_with = "site_dir")]
    origin: Option<String>,

    /// Serve the site from a local directory instead of the network
    #[arg(long)]
    site_dir: Option<PathBuf>,

    /// Site-wide sitemap path
    #[arg(long)]
    sitemap: Option<String>,

    /// Navigation partial loaded into the panel
    #[arg(long)]
    panel: Option<String>,

    /// Category for pages with neither tags nor a subdirectory
    #[arg(long)]
    default_category: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Tree state file (defaults to the platform data directory)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Keep tree state in memory only
    #[arg(long, default_value = "false")]
    no_persist: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate page paths under a directory
    Discover { base: String },
    /// Discover, describe and group the pages under a directory (JSON)
    List { base: String },
    /// Mount the panel for a page and print it
    Panel {
        /// Current page path
        #[arg(long, default_value = "/")]
        path: String,
        /// Print the folder outline as JSON instead of markup
        #[arg(long)]
        outline: bool,
    },
    /// Toggle one folder and print its new state
    Toggle {
        key: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Expand (ArrowRight) or collapse (ArrowLeft) one folder
    Key {
        key: String,
        /// `right` or `left`
        direction: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Collapse every folder
    CollapseAll {
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Expand every folder
    ExpandAll {
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Flip the panel-level collapsed flag
    ToggleSidebar,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("navtree: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = NavConfig::default();
    if let Some(sitemap) = &cli.sitemap {
        config = config.with_sitemap(sitemap.as_str());
    }
    if let Some(panel) = &cli.panel {
        config = config.with_panel_markup(panel.as_str());
    }
    if let Some(category) = &cli.default_category {
        config = config.with_default_category(category.as_str());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let fetcher = make_fetcher(&cli, &config)?;
    let engine = Arc::new(ContentEngine::new(Arc::clone(&fetcher), config.clone()));

    match cli.command {
        Command::Discover { ref base } => {
            let paths = engine.discover(base, &[]);
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        Command::List { ref base } => {
            let listing = engine.listing(base, &[]);
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Panel { ref path, outline } => {
            let panel = mount(&cli, &config, engine, path);
            if outline {
                println!("{}", serde_json::to_string_pretty(&panel.outline())?);
            } else {
                println!("{}", panel.to_html());
            }
        }
        Command::Toggle { ref key, ref path } => {
            let mut panel = mount(&cli, &config, engine, path);
            if !panel.dispatch(UiEvent::TwistyClick(key.clone())) {
                return Err(format!("no toggle bound for folder {}", key).into());
            }
            print_folder(&panel, key);
        }
        Command::Key { ref key, ref direction, ref path } => {
            let nav_key = match direction.as_str() {
                "right" => NavKey::ArrowRight,
                "left" => NavKey::ArrowLeft,
                _ => NavKey::Other,
            };
            let mut panel = mount(&cli, &config, engine, path);
            if !panel.dispatch(UiEvent::RowKey(key.clone(), nav_key)) {
                return Err(format!("key {} ignored for folder {}", direction, key).into());
            }
            print_folder(&panel, key);
        }
        Command::CollapseAll { ref path } => {
            let mut panel = mount(&cli, &config, engine, path);
            panel.dispatch(UiEvent::CollapseAll);
            println!("collapsed {} folders", panel.folders().len());
        }
        Command::ExpandAll { ref path } => {
            let mut panel = mount(&cli, &config, engine, path);
            panel.dispatch(UiEvent::ExpandAll);
            println!("expanded {} folders", panel.folders().len());
        }
        Command::ToggleSidebar => {
            let mut panel = mount(&cli, &config, engine, "/");
            panel.dispatch(UiEvent::ToggleSidebar);
            println!("sidebar collapsed: {}", panel.store().sidebar_collapsed());
        }
    }
    Ok(())
}

#[cfg_attr(not(feature = "http"), allow(unused_variables))]
fn make_fetcher(cli: &Cli, config: &NavConfig) -> Result<Arc<dyn Fetcher>, Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.site_dir {
        return Ok(Arc::new(LocalSite::new(dir)));
    }
    #[cfg(feature = "http")]
    if let Some(origin) = &cli.origin {
        return Ok(Arc::new(navtree::net::HttpFetcher::new(origin, config)?));
    }
    Err("one of --origin or --site-dir is required".into())
}

fn state_store(cli: &Cli, config: &NavConfig) -> TreeStateStore {
    if cli.no_persist {
        return TreeStateStore::in_memory(config);
    }
    let file = match &cli.state_file {
        Some(path) => Some(FileStore::new(path)),
        None => FileStore::default_location(),
    };
    match file {
        Some(file) => {
            log::debug!("tree state at {}", file.path().display());
            TreeStateStore::open(Box::new(file), config)
        }
        None => {
            log::warn!("no data directory available; tree state will not persist");
            TreeStateStore::in_memory(config)
        }
    }
}

/// Anchors of the host page, for the last discovery fallback.
fn page_anchors(fetcher: &dyn Fetcher, path: &str) -> Vec<String> {
    match fetcher.fetch_text(path) {
        Ok(html) => page_hrefs(&html),
        Err(e) => {
            log::debug!("host page {} unavailable: {}", path, e);
            Vec::new()
        }
    }
}

fn mount(cli: &Cli, config: &NavConfig, engine: Arc<ContentEngine>, path: &str) -> NavPanel {
    let fetcher = Arc::clone(engine.fetcher());
    let root = load_panel(fetcher.as_ref(), config);
    let mut panel = NavPanel::new(root, path, engine, state_store(cli, config))
        .with_page_anchors(page_anchors(fetcher.as_ref(), path));
    panel.init();
    panel
}

fn print_folder(panel: &NavPanel, key: &str) {
    match panel.is_folder_expanded(key) {
        Some(true) => println!("{}: expanded", key),
        Some(false) => println!("{}: collapsed", key),
        None => println!("{}: not found", key),
    }
}
