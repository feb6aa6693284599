pub mod auth;
pub mod common;
pub mod config;
pub mod countdown;
pub mod exploit;
pub mod lookup;
pub mod sequence;
