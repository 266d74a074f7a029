//! Flutter bridge for the notes core.

pub mod api;
mod store;
