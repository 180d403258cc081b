//! # webbeaver
//!
//! Forensic extraction of browser history, downloads and cookies.
//!
//! Point [`pipeline::run_extraction`] at a directory tree holding browser
//! profiles. It finds the Chromium and Firefox SQLite databases, decodes
//! them into browser-agnostic records and reports, per category, which files
//! could not be read and why.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod family;
pub mod logging;
pub mod metadata;
pub mod parsers;
pub mod pipeline;
pub mod scanner;
