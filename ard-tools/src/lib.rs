pub mod utils;
pub use ard_bricks::{Error, Result};

pub mod proc;
pub use proc::*;

pub mod cli;
