pub mod environment;
pub mod kafka;
pub mod logs;
