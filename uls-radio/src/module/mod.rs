pub mod channel;
pub mod export;
pub mod uls;
