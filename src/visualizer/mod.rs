// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Live display of annotated frames.

#[cfg(feature = "visualize")]
pub mod viewer;

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
