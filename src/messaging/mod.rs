pub mod channels;
pub mod command;
pub mod console;
