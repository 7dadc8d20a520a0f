//! UI module root: drawing functions for the tabs and overlays.

pub mod agents;
pub mod assets;
pub mod downloads;
pub mod header;
pub mod overlay;
pub mod table;
pub mod theme;
pub mod util;
