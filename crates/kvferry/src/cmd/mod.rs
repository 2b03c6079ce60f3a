//! Subcommand implementations

pub mod load;
pub mod split;
pub mod validate;
pub mod verify;
