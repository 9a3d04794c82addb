//! Debounced place search.
//!
//! [`QueryScheduler`] turns a stream of keystrokes into at most one lookup per
//! quiet period and tags each lookup with a [`QueryTicket`].
//! [`SearchSession`] owns the text, the result list and the panel visibility,
//! and only applies results whose ticket is still current.

mod scheduler;
mod session;

pub use scheduler::{QueryScheduler, QueryTicket};
pub use session::{MAX_SEARCH_RESULTS, SearchSession, SearchView};
