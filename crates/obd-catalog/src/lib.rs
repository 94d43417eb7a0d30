//! Command Catalog
//!
//! Static OBD-II command definitions: categories, probe descriptors with
//! request encoding and decode formulas, and the AT-style control commands
//! used to set an adapter up. The scanning engine treats every entry here
//! as an opaque probe; this crate owns what the bytes mean.

mod category;
mod control;
mod descriptor;
mod error;
mod registry;
pub mod response;

pub use category::Category;
pub use control::{init_sequence, ControlCommand, Protocol};
pub use descriptor::{DecodedValue, Decoder, ProbeDescriptor};
pub use error::DecodeError;
pub use registry::catalog;
