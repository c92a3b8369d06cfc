//! Growable byte containers
//!
//! ## Core Containers
//!
//! - **`ExtensibleBuffer`** - binary-safe byte buffer with doubling growth,
//!   `fmt::Write`/`io::Write` support and escaped appends
//! - **`ArrayList`** - double-ended array of variable-length byte elements

pub mod array_list;
pub mod xstr;

pub use array_list::ArrayList;
pub use xstr::ExtensibleBuffer;
