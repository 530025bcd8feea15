//! Maps a user's date range onto what the upstream provider should be asked
//! for, and cuts a full history down to that range. Everything here is pure.

mod period;
mod window;

pub use period::resolve_period;
pub use window::filter_window;
