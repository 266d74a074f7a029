//! Read-only projections of the note collection for list rendering.

pub mod list;
pub mod preview;
