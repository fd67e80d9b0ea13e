//! UI module root: exposes drawing functions for individual panels.

pub mod compact;
pub mod graphs;
pub mod header;
pub mod util;
