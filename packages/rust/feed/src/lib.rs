//! Feed output for shelfwatch: RSS rendering and announcement history.

pub mod history;
pub mod render;

pub use history::{History, history_path, load_history, save_history};
pub use render::{now_jst, render_feed};
