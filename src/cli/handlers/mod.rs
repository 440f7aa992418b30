use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::controller::{Controller, VIEW_MODE_KEY, ViewMode};
use crate::io::backend::{CollectionBackend, FileBackend};
use crate::io::collection_io::{self, CollectionError};
use crate::io::state::{KeyValueStore, StateFile};
use crate::model::{Collection, Page, SortBy, SortColumn, SortDirection};
use crate::ops::lists::build_add_to_lists;
use crate::ops::search::search_pages;
use crate::ops::sort::sort_pages;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let root = collection_root(cli.collection_dir.as_deref())?;

    match cli.command {
        None => Ok(()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::Pages(args) => cmd_pages(&root, args, json),
            Commands::Recordings => cmd_recordings(&root, json),
            Commands::Lists => cmd_lists(&root, json),
            Commands::Bookmarks(args) => cmd_bookmarks(&root, args, json),
            Commands::View(args) => cmd_view(&root, args, json),

            // Write commands
            Commands::Mv(args) => cmd_mv(&root, args),
            Commands::Add(args) => cmd_add(&root, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The collection directory: the -C override, or the nearest directory at
/// or above the working directory holding a collection.json.
fn collection_root(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    Ok(collection_io::discover_collection(&start)?)
}

fn load(root: &Path) -> Result<Collection, CollectionError> {
    collection_io::load_collection(root)
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_pages(root: &Path, args: PagesArgs, json: bool) -> CmdResult {
    let collection = load(root)?;
    let mut sort = collection.sort;
    if let Some(column) = &args.sort {
        sort = SortBy {
            column: column.parse::<SortColumn>()?,
            direction: SortDirection::Asc,
        };
    }
    if args.desc {
        sort.direction = SortDirection::Desc;
    }

    let mut pages = search_pages(&collection.pages, args.search.as_deref().unwrap_or(""));
    sort_pages(&mut pages, sort);

    if json {
        let out: Vec<PageJson> = pages
            .iter()
            .enumerate()
            .map(|(i, p)| page_to_json(i, p))
            .collect();
        return print_json(&out);
    }
    if pages.is_empty() {
        match &args.search {
            Some(q) => println!("no pages match '{}'", q),
            None => println!("no pages"),
        }
        return Ok(());
    }
    let title_w = title_width(pages.iter().map(|p| p.title.as_str()));
    for (i, page) in pages.iter().enumerate() {
        println!("{}", format_page_line(i, page, title_w));
    }
    Ok(())
}

fn cmd_recordings(root: &Path, json: bool) -> CmdResult {
    let controller = Controller::new(load(root)?);
    if json {
        let out: Vec<RecordingJson> = controller.groups().iter().map(group_to_json).collect();
        return print_json(&out);
    }
    for (i, group) in controller.groups().iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_recording(group) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_lists(root: &Path, json: bool) -> CmdResult {
    let collection = load(root)?;
    if json {
        let out: Vec<ListJson> = collection.lists.iter().map(list_to_json).collect();
        return print_json(&out);
    }
    if collection.lists.is_empty() {
        println!("no lists");
        return Ok(());
    }
    let id_w = collection.lists.iter().map(|l| l.id.len()).max().unwrap_or(0);
    for list in &collection.lists {
        println!("{}", format_list_line(list, id_w));
    }
    Ok(())
}

fn cmd_bookmarks(root: &Path, args: BookmarksArgs, json: bool) -> CmdResult {
    let collection = load(root)?;
    let list = collection
        .find_list(&args.list)
        .ok_or_else(|| CollectionError::UnknownList(args.list.clone()))?;
    if json {
        let out: Vec<BookmarkJson> = list
            .bookmarks
            .iter()
            .enumerate()
            .map(|(i, b)| bookmark_to_json(i, b))
            .collect();
        return print_json(&out);
    }
    let title_w = title_width(list.bookmarks.iter().map(|b| b.title.as_str()));
    for (i, bookmark) in list.bookmarks.iter().enumerate() {
        println!("{}", format_bookmark_line(i, bookmark, title_w));
    }
    Ok(())
}

/// Print the persisted view, or persist a new one.
fn cmd_view(root: &Path, args: ViewArgs, json: bool) -> CmdResult {
    let mut store = StateFile::open(&collection_io::state_dir(root));
    let mode = match args.mode {
        Some(raw) => {
            let mode: ViewMode = raw.parse()?;
            store.set(VIEW_MODE_KEY, mode.to_stored())?;
            mode
        }
        None => {
            let mut controller = Controller::new(load(root)?);
            controller.mount(&store);
            controller.view_mode()
        }
    };
    if json {
        return print_json(&ViewJson { view: mode.label() });
    }
    println!("{}", mode.label());
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_mv(root: &Path, args: MvArgs) -> CmdResult {
    let mut backend = FileBackend::new(root);
    let mut controller = Controller::new(backend.load()?);
    if !controller.open_list(Some(&args.list)) {
        return Err(CollectionError::UnknownList(args.list).into());
    }
    let len = controller.displayed_len();
    if !controller.move_bookmark(args.from, args.to) {
        return Err(format!(
            "cannot move {} to {}: list '{}' has {} bookmarks",
            args.from, args.to, args.list, len
        )
        .into());
    }
    controller.save_order(&mut backend)?;
    let moved = &controller.active_bookmarks()[args.to];
    println!("moved {} to position {}", moved.id, args.to);
    Ok(())
}

fn cmd_add(root: &Path, args: AddArgs) -> CmdResult {
    let mut backend = FileBackend::new(root);
    let controller = Controller::new(backend.load()?);
    let collection = controller.collection();

    if let Some(missing) = args.lists.iter().find(|id| collection.find_list(id).is_none()) {
        return Err(CollectionError::UnknownList(missing.clone()).into());
    }
    let checked: IndexMap<String, bool> = collection
        .lists
        .iter()
        .map(|l| (l.id.clone(), args.lists.contains(&l.id)))
        .collect();

    let mut pages: Vec<Page> = Vec::new();
    for &index in &args.pages {
        let page = controller.pages().get(index).ok_or_else(|| {
            format!(
                "no page at position {} (collection has {})",
                index,
                controller.pages().len()
            )
        })?;
        if !pages.iter().any(|p| p.id == page.id) {
            pages.push(page.clone());
        }
    }

    let Some(request) = build_add_to_lists(pages, &checked) else {
        return Ok(());
    };
    let added = backend.add_pages_to_lists(&request)?;
    let plural = if added == 1 { "" } else { "s" };
    println!("added {} bookmark{}", added, plural);
    Ok(())
}
