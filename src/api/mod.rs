//! REST API module.
//!
//! Contains all endpoint handlers following the web client's contract.

mod application;
mod contact;
mod location;

pub use application::*;
pub use contact::*;
pub use location::*;
