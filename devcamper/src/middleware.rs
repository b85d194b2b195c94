//! This module contains all the routers' middlewares
//!
#[cfg(test)]
pub use test_util::*;

pub mod auth;
pub mod logging;
