pub mod data_channel;
pub mod network;
pub mod pasv;

pub use data_channel::{DataChannel, DataConnection};
