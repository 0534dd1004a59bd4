// State management module.
// Handles the article list, selection, and expansion state.

pub mod posts;

pub use posts::{PostEntry, PostListState};
