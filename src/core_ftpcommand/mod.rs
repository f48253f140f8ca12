// Here's the list of the FTP commands implemented
pub mod cdup;
pub mod cwd;
pub mod ftpcommand;
pub mod handlers;
pub mod help;
pub mod list;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;

// The utils and common functions are here
pub mod utils;
