//! liftcycle - Personal workout tracker
//!
//! Routines rotate day by day; a guided session walks through one of them
//! set by set and records it in the training history.

pub mod cheers;
pub mod clock;
pub mod db;
pub mod editor;
pub mod history;
pub mod model;
pub mod rotation;
pub mod session;
pub mod storage;
pub mod tui;

pub use db::Database;
pub use storage::Storage;
