pub mod automation;
pub mod lists;
pub mod search;
pub mod sort;
