#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! cvtsudoers: convert a sudoers policy to JSON.

pub mod cli;
pub mod context;
pub mod driver;
pub mod errors;
pub mod export;
pub mod policy_host;
pub mod types;

pub use driver::{Driver, Outcome};
