// Error types for path containment and data-channel transfers
use crate::core_reply::Reply;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JailError {
    #[error("Path escapes the root directory: {0}")]
    OutsideRoot(PathBuf),

    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JailError {
    pub fn to_ftp_response(&self) -> Reply {
        match self {
            JailError::OutsideRoot(_) => Reply::new(550, "Access denied."),
            JailError::NotFound(_) => Reply::new(550, "No such file or directory."),
            JailError::NotADirectory(_) => Reply::new(550, "Not a directory."),
            JailError::NotAFile(_) => Reply::new(550, "Not a regular file."),
            JailError::Resolve { .. } => Reply::new(550, "Invalid path."),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("No data connection pending, use PASV first")]
    NoDataChannel,

    #[error("Failed to bind passive listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Failed to accept data connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("No data connection within {0:?}")]
    AcceptTimedOut(Duration),

    #[error("Data transfer failed: {0}")]
    Copy(#[source] std::io::Error),

    #[error("Data transfer stalled for {0:?}")]
    Stalled(Duration),

    #[error("Data transfer exceeded {0:?}")]
    DeadlineExceeded(Duration),
}

impl TransferError {
    pub fn to_ftp_response(&self) -> Reply {
        match self {
            TransferError::NoDataChannel => Reply::new(425, "Use PASV first."),
            TransferError::Bind(_)
            | TransferError::Accept(_)
            | TransferError::AcceptTimedOut(_) => {
                Reply::new(425, "Can't open data connection.")
            }
            TransferError::Copy(_)
            | TransferError::Stalled(_)
            | TransferError::DeadlineExceeded(_) => {
                Reply::new(426, "Connection closed; transfer aborted.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_errors_map_to_550() {
        let errors = [
            JailError::OutsideRoot(PathBuf::from("/srv2")),
            JailError::NotFound(PathBuf::from("/srv/missing")),
            JailError::NotADirectory(PathBuf::from("/srv/file")),
            JailError::NotAFile(PathBuf::from("/srv/dir")),
        ];
        for e in errors {
            assert_eq!(e.to_ftp_response().code, 550);
        }
    }

    #[test]
    fn test_transfer_errors_split_between_425_and_426() {
        assert_eq!(TransferError::NoDataChannel.to_ftp_response().code, 425);
        assert_eq!(
            TransferError::AcceptTimedOut(Duration::from_secs(1))
                .to_ftp_response()
                .code,
            425
        );
        assert_eq!(
            TransferError::Stalled(Duration::from_secs(1))
                .to_ftp_response()
                .code,
            426
        );
        assert_eq!(
            TransferError::DeadlineExceeded(Duration::from_secs(60))
                .to_ftp_response()
                .code,
            426
        );
        let copy = TransferError::Copy(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(copy.to_ftp_response().code, 426);
    }
}
