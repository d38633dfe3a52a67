pub mod coords;
pub mod core;
pub mod error;
