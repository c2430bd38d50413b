//! Exit codes for the CLI

/// Success
pub const SUCCESS: u8 = 0;

/// The operator declined the confirmation prompt
pub const DECLINED: u8 = 1;
