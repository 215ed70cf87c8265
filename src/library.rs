//! Track library: directory scanning, the filtered view and remote downloads.

mod catalog;
mod model;
mod remote;
mod scan;

pub use catalog::Library;
pub use model::{DirEntry, Track};
pub use remote::{Fetch, FetchError, HttpFetcher, spawn_fetch};
pub use scan::list_entries;
