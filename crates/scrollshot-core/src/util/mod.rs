// Utility modules

pub mod detect;
pub mod encode;
pub mod export;
