//! Library components of the record grid CLI.

pub mod app;
pub mod logging;
pub mod sample;
pub mod table;
