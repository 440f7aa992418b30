pub mod backend;
pub mod collection_io;
pub mod config_io;
pub mod loader;
pub mod logging;
pub mod state;
pub mod watcher;
