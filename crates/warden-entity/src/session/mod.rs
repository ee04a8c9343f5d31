//! Session domain entities.

pub mod accounting;
pub mod model;
pub mod token;

pub use accounting::SessionAccounting;
pub use model::{DeviceInfo, Session};
pub use token::IssuedToken;
