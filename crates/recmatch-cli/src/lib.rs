//! Library side of the `recmatch` command-line tool.
//!
//! Holds logging setup, configuration file handling and the file-level
//! pipeline steps so they can be tested without spawning the binary.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod pipeline;
