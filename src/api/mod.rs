pub mod attendance;
pub mod profile;
