//! Validated newtypes and enums shared across the gateway.

mod data_amount;
mod iccid;
mod source;

pub use data_amount::{BYTES_PER_GB, bytes_to_gb, gb_to_bytes, parse_gb};
pub use iccid::{Iccid, IccidError};
pub use source::DataSource;
