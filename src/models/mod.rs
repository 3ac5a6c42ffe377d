//! Data models for the rental assistance intake application.
//!
//! These models match the web client's JSON contract exactly for seamless
//! interoperability.

mod draft;
mod location;
mod requests;

pub use draft::*;
pub use location::*;
pub use requests::*;
