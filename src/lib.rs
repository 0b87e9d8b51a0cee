//! Area Window List
//!
//! Ordering and command core of the "all windows" list: workspace sections,
//! owner and class grouping, and bulk commands over a selection.

pub mod config;
pub mod shared;
pub mod wm;

pub use config::WindowListConfig;
pub use wm::WindowList;
