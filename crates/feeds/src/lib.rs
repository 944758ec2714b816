//! Account data collection from the OKX REST API.
//!
//! ## Architecture
//!
//! - `signer` - OKX request signing (HMAC-SHA256, base64)
//! - `rest` - `OkxClient` with public and signed GET helpers
//! - `affirmation` - unauthenticated affirmation source
//! - `fetchers` - fault-isolated fetchers that always yield display text

pub mod affirmation;
pub mod error;
pub mod fetchers;
pub mod rest;
pub mod signer;

pub use affirmation::*;
pub use error::*;
pub use fetchers::*;
pub use rest::*;
pub use signer::*;
