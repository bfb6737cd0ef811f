pub mod listing;
pub mod logging;

pub use listing::{filter_text, paginate, ListQuery, PageSlice};
pub use logging::truncate_text;
