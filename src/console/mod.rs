pub mod console;

pub use console::{AsyncConsole, ConsoleWriter};
