//! Utility modules shared by the value types.

pub(crate) mod datetime;
