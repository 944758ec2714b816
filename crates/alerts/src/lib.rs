//! SMS delivery for the account digest.
//!
//! This crate provides:
//! - The `SmsChannel` trait shared by every provider
//! - Twilio (telecom API) and Infobip (REST gateway) channels
//! - A `Dispatcher` bound to a single recipient

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod infobip;
pub mod twilio;

pub use channel::{DeliveryReceipt, SmsChannel, SmsChannelKind};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use infobip::{InfobipChannel, InfobipConfig};
pub use twilio::{TwilioChannel, TwilioConfig};
