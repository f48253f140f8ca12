pub mod path_jail;

pub use path_jail::{contains, resolve, PathJail};
