//! Dashboard controller

pub mod dashboard;
pub mod status;

pub use dashboard::{
    Dashboard, LINK_STALE_MS, POLL_INTERVAL_MS, STATUS_UPDATE_MS, UI_UPDATE_MS,
};
pub use status::StatusIndicators;
