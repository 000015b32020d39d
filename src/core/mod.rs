pub mod app;
pub mod character;
pub mod config;
pub mod directory;
pub mod greeting;
pub mod message;
pub mod session;
