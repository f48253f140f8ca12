pub mod error;

pub use error::{JailError, TransferError};
