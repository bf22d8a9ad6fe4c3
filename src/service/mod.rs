pub mod attendance;
pub mod history;
pub mod stats;
