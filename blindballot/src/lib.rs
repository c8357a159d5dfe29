#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

mod blind;
mod codec;
mod error;
mod issuance;
mod keys;
mod redemption;
mod serde_hex;
mod session;

pub use blind::*;
pub use codec::*;
pub use error::*;
pub use issuance::*;
pub use keys::*;
pub use redemption::*;
pub use serde_hex::*;
pub use session::*;

pub use num_bigint::BigUint;
