//! Serialization helpers
//!
//! [`VarNum`] is the variable-length integer format used for the length
//! prefixes of map and list dumps.

pub mod var_num;

pub use var_num::VarNum;
