use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wrc", about = concat!("wrc v", env!("CARGO_PKG_VERSION"), " - browse web-recording collections"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different collection directory
    #[arg(short = 'C', long = "collection-dir", global = true)]
    pub collection_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the collection's pages
    Pages(PagesArgs),
    /// List recordings with their pages
    Recordings,
    /// List bookmark lists
    Lists,
    /// Show the bookmarks of a list, in order
    Bookmarks(BookmarksArgs),
    /// Move a bookmark within a list and save the new order
    Mv(MvArgs),
    /// Bookmark pages into one or more lists
    Add(AddArgs),
    /// Show or set the view the TUI opens in
    View(ViewArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PagesArgs {
    /// Sort column (timestamp, title, url, browser)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// Only pages whose title or URL matches (regex, case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct BookmarksArgs {
    /// List ID
    pub list: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MvArgs {
    /// List ID
    pub list: String,
    /// Current position of the bookmark (0-based)
    pub from: usize,
    /// New position (0-based)
    pub to: usize,
}

#[derive(Args)]
pub struct AddArgs {
    /// Lists to add the pages to
    #[arg(required = true)]
    pub lists: Vec<String>,
    /// Page positions as listed by `wrc pages` without options
    #[arg(long, num_args = 1.., required = true)]
    pub pages: Vec<usize>,
}

#[derive(Args)]
pub struct ViewArgs {
    /// flat or grouped (omit to show the current view)
    pub mode: Option<String>,
}
