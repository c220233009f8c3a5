pub mod channel;
pub mod mock;
