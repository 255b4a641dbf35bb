// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! Argument parsing, console output macros, and the `detect` command that
//! runs the detection pipeline over a video source.

/// CLI arguments.
pub mod args;

/// The `detect` command.
pub mod detect;

/// Console output macros and verbosity state.
pub mod logging;
