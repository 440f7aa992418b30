use std::io;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use indexmap::IndexMap;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use regex::Regex;

use crate::controller::scroll::ScrollMetrics;
use crate::controller::{Controller, ViewMode};
use crate::io::backend::{CollectionBackend, FileBackend};
use crate::io::collection_io::{discover_collection, load_collection, state_dir};
use crate::io::config_io::read_config;
use crate::io::loader::Loader;
use crate::io::logging::init_file_logging;
use crate::io::state::{KeyValueStore, StateFile};
use crate::io::watcher::CollectionWatcher;
use crate::model::{Page, UiConfig};
use crate::ops::search::query_regex;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Search,
    /// Reordering the bookmark under the cursor
    Move,
    AddToList,
    Automation,
    /// Waiting for y/n before deleting a recording
    ConfirmDelete,
}

/// Checkbox per collection list, keyed by list ID in collection order
#[derive(Debug, Clone, Default)]
pub struct AddToListModal {
    /// Pages to add, in selection order
    pub pages: Vec<Page>,
    pub checked: IndexMap<String, bool>,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutomationField {
    #[default]
    Name,
    Links,
}

#[derive(Debug, Clone, Default)]
pub struct AutomationModal {
    pub field: AutomationField,
    pub name: String,
    pub links: String,
    /// The automation was queued; the modal only shows a confirmation
    pub created: bool,
}

/// Recording awaiting delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDelete {
    pub rec_id: String,
    pub title: String,
    pub pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub error: bool,
}

/// A row of the grouped view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupedRow {
    /// Recording header (index into the controller's groups)
    Header { group: usize },
    /// Page `index` of group `group`
    Page { group: usize, index: usize },
}

/// Rows of the grouped view, honoring which groups are expanded
pub fn grouped_rows(controller: &Controller) -> Vec<GroupedRow> {
    let mut rows = Vec::new();
    for (gi, group) in controller.groups().iter().enumerate() {
        rows.push(GroupedRow::Header { group: gi });
        if controller.is_group_expanded(group.id()) {
            rows.extend((0..group.pages.len()).map(|index| GroupedRow::Page { group: gi, index }));
        }
    }
    rows
}

/// Main application state
pub struct App {
    pub controller: Controller,
    pub backend: Box<dyn CollectionBackend>,
    pub store: Box<dyn KeyValueStore>,
    pub loader: Option<Loader>,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub mode: Mode,
    pub should_quit: bool,
    /// Cursor row of the flat table
    pub cursor: usize,
    /// First visible row of the flat table
    pub scroll_offset: usize,
    /// Cursor row of the grouped view (scroll lives in the controller)
    pub grouped_cursor: usize,
    /// Data rows that fit in the table area, updated on every render
    pub table_height: usize,
    /// Where the table was last drawn, for mouse hit tests
    pub table_area: Option<Rect>,
    /// Search mode: query being typed
    pub search_input: String,
    pub add_to_list: Option<AddToListModal>,
    pub automation: Option<AutomationModal>,
    pub confirm_delete: Option<ConfirmDelete>,
    pub status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        controller: Controller,
        backend: Box<dyn CollectionBackend>,
        store: Box<dyn KeyValueStore>,
        ui: &UiConfig,
    ) -> Self {
        App {
            controller,
            backend,
            store,
            loader: None,
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
            mode: Mode::Navigate,
            should_quit: false,
            cursor: 0,
            scroll_offset: 0,
            grouped_cursor: 0,
            table_height: 20,
            table_area: None,
            search_input: String::new(),
            add_to_list: None,
            automation: None,
            confirm_delete: None,
            status: None,
        }
    }

    /// Regex for highlighting matches. In Search mode: compiled from the
    /// current input. Otherwise from the applied search.
    pub fn active_search_re(&self) -> Option<Regex> {
        match self.mode {
            Mode::Search => query_regex(&self.search_input),
            _ => query_regex(self.controller.search_text()),
        }
    }

    /// Rows in the current view
    pub fn row_count(&self) -> usize {
        match self.controller.view_mode() {
            ViewMode::Flat => self.controller.displayed_len(),
            ViewMode::Grouped => self.controller.grouped_row_count(),
        }
    }

    pub fn current_cursor(&self) -> usize {
        match self.controller.view_mode() {
            ViewMode::Flat => self.cursor,
            ViewMode::Grouped => self.grouped_cursor,
        }
    }

    pub fn scroll_top(&self) -> usize {
        match self.controller.view_mode() {
            ViewMode::Flat => self.scroll_offset,
            ViewMode::Grouped => self.controller.grouped_scroll(),
        }
    }

    /// Move the cursor of the current view by `delta` rows.
    pub fn move_cursor(&mut self, delta: isize, now: Instant) {
        let last = self.row_count().saturating_sub(1);
        let target = self.current_cursor().saturating_add_signed(delta).min(last);
        self.set_cursor(target, now);
    }

    pub fn set_cursor(&mut self, row: usize, now: Instant) {
        let row = row.min(self.row_count().saturating_sub(1));
        match self.controller.view_mode() {
            ViewMode::Flat => self.cursor = row,
            ViewMode::Grouped => self.grouped_cursor = row,
        }
        self.follow_cursor(now);
    }

    /// Scroll so the cursor is visible.
    pub fn follow_cursor(&mut self, now: Instant) {
        let height = self.table_height.max(1);
        let cursor = self.current_cursor();
        let mut top = self.scroll_top();
        if cursor < top {
            top = cursor;
        } else if cursor >= top + height {
            top = cursor + 1 - height;
        }
        self.set_scroll_top(top, now);
    }

    /// Scroll the current view, reporting the new position to the
    /// controller when it moved.
    pub fn set_scroll_top(&mut self, top: usize, now: Instant) {
        let height = self.table_height.max(1);
        let total = self.row_count();
        let top = top.min(total.saturating_sub(height));
        if top == self.scroll_top() {
            return;
        }
        match self.controller.view_mode() {
            ViewMode::Flat => self.scroll_offset = top,
            ViewMode::Grouped => self.controller.set_grouped_scroll(top),
        }
        self.controller.on_scroll(
            ScrollMetrics {
                client_height: height,
                scroll_height: total,
                scroll_top: top,
            },
            now,
        );
    }

    /// Keep cursors inside the current data after it was replaced.
    pub fn clamp_cursors(&mut self) {
        let flat_last = self.controller.displayed_len().saturating_sub(1);
        self.cursor = self.cursor.min(flat_last);
        self.scroll_offset = self.scroll_offset.min(self.cursor);
        let grouped_last = self.controller.grouped_row_count().saturating_sub(1);
        self.grouped_cursor = self.grouped_cursor.min(grouped_last);
    }

    /// Start loading the collection again. Without a background loader the
    /// load runs inline through the backend.
    pub fn request_reload(&mut self) {
        let ticket = self.controller.begin_load();
        match &self.loader {
            Some(loader) => loader.request(ticket),
            None => match self.backend.load() {
                Ok(collection) => {
                    self.controller.finish_load(&ticket, collection);
                    self.clamp_cursors();
                }
                Err(e) => self.set_error(format!("reload failed: {}", e)),
            },
        }
    }

    /// Apply finished background loads. Stale completions are dropped by
    /// the controller.
    pub fn apply_loads(&mut self) {
        let completions = match &self.loader {
            Some(loader) => loader.poll(),
            None => return,
        };
        for completion in completions {
            match completion.result {
                Ok(collection) => {
                    if self.controller.finish_load(&completion.ticket, collection) {
                        self.clamp_cursors();
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "background load failed");
                    self.set_error(format!("reload failed: {}", e));
                }
            }
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: true,
        });
    }
}

/// The collection view while it is on screen.
///
/// Creating it mounts the controller (restoring the view mode and
/// listening for keys); dropping it unmounts, cancelling timers and
/// outstanding loads on every exit path.
pub struct ViewMount<'a> {
    app: &'a mut App,
}

impl<'a> ViewMount<'a> {
    pub fn new(app: &'a mut App) -> Self {
        app.controller.mount(&*app.store);
        ViewMount { app }
    }
}

impl Deref for ViewMount<'_> {
    type Target = App;

    fn deref(&self) -> &App {
        &*self.app
    }
}

impl DerefMut for ViewMount<'_> {
    fn deref_mut(&mut self) -> &mut App {
        &mut *self.app
    }
}

impl Drop for ViewMount<'_> {
    fn drop(&mut self) {
        self.app.controller.unmount();
    }
}

/// Raw mode, alternate screen, mouse capture and (optionally) the kitty
/// keyboard protocol, restored on drop and on panic.
struct TerminalGuard {
    keyboard_flags: bool,
}

impl TerminalGuard {
    fn enter(kitty_keyboard: bool) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        // Modifier key presses are only reported with all keys sent as
        // escape codes.
        let keyboard_flags = kitty_keyboard && supports_keyboard_enhancement().unwrap_or(false);
        if keyboard_flags {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )?;
        }
        tracing::debug!(keyboard_flags, "terminal ready");

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal(keyboard_flags);
            original_hook(panic_info);
        }));

        Ok(TerminalGuard { keyboard_flags })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(self.keyboard_flags);
    }
}

fn restore_terminal(keyboard_flags: bool) {
    let mut stdout = io::stdout();
    if keyboard_flags {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

/// Run the TUI application
pub fn run(collection_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match collection_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = discover_collection(&start)?;
    let state = state_dir(&root);
    init_file_logging(&state)?;

    let config = read_config(&root)?;
    let collection = load_collection(&root)?;
    tracing::info!(
        root = %root.display(),
        pages = collection.pages.len(),
        lists = collection.lists.len(),
        "opening collection"
    );

    let mut app = App::new(
        Controller::new(collection),
        Box::new(FileBackend::new(&root)),
        Box::new(StateFile::open(&state)),
        &config.ui,
    );
    app.loader = Some(Loader::new(&root));

    let watcher = match CollectionWatcher::start(&root) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "not watching collection for changes");
            None
        }
    };

    let guard = TerminalGuard::enter(config.ui.kitty_keyboard != Some(false))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let result = {
        let mut view = ViewMount::new(&mut app);
        run_event_loop(&mut terminal, &mut view, watcher.as_ref())
    };

    drop(guard);
    terminal.show_cursor()?;
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&CollectionWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            tracing::debug!("collection changed on disk");
            app.request_reload();
        }
        app.apply_loads();
        app.controller.tick(Instant::now());

        terminal.draw(|frame| render::render(frame, app))?;

        // Short poll so debounce deadlines fire close to on time
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key, Instant::now());
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, Instant::now()),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
