//! Built-in middleware.
//!
//! All three act in the post-phase, after the route has produced (or failed
//! to produce) a result.

mod layout;
mod not_found;
mod title;

pub use layout::{Layout, LayoutSink};
pub use not_found::NotFound;
pub use title::{Title, TitleSink};
