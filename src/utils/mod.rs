pub mod db_utils;
pub mod profile_cache;
