#![allow(missing_docs)]

#[macro_use]
mod macros;

pub(crate) mod alert;
pub(crate) mod ccs;
pub mod codec;
pub mod enums;
pub mod handshake;
pub(crate) mod message;
