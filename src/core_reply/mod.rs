pub mod reply;

pub use reply::{send_reply, Reply, ReplyWriter, SharedWriter};
