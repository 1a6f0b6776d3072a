//! Concrete entities shared across services

pub mod mail_address;

pub use mail_address::{MailAddress, MailAddressError};
