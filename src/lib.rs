pub mod api;
pub mod core;
pub mod format;
pub mod interaction_log;
pub mod logging;
