pub mod collection;
pub mod config;
pub mod page;

pub use collection::*;
pub use config::*;
pub use page::*;
