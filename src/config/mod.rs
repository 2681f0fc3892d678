mod loader;
mod structs;

pub use structs::*;
