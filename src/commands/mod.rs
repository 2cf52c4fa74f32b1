mod comic_command;

pub use comic_command::*;
