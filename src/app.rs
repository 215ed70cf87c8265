//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the cursor, the prompt
//! and the last known playback picture.

mod model;

pub use model::*;
