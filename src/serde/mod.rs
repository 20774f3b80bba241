//! Serde helpers.

pub mod duration_millis;
pub mod hash_map;
