pub mod cli;
pub mod controller;
pub mod io;
pub mod model;
pub mod ops;
pub mod tui;
