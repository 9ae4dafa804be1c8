//! Unified exit codes. Part of the public contract.

pub const SUCCESS: i32 = 0;
pub const RUNTIME_ERROR: i32 = 1; // A run started and failed
pub const CONFIG_ERROR: i32 = 2; // Config missing/invalid; nothing was processed
