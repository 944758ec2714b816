//! Core data types and text rendering for the account digest.

pub mod account;
pub mod digest;
pub mod grid;
pub mod number;
pub mod price;

pub use account::*;
pub use digest::*;
pub use grid::*;
pub use number::*;
pub use price::*;
