//! rostergrid - interactive roster tables in the terminal.
//!
//! The [`table`] module is a headless table engine: column declarations and
//! rows in, sorted and filtered rows and rendered cells out. [`activation`]
//! turns a cell interaction into a detail lookup and navigation. The rest of
//! the crate is the terminal front end built on top of them.

pub mod activation;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod lookup;
pub mod roster;
pub mod table;
pub mod tasks;
pub mod ui;
