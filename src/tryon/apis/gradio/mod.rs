pub mod config;
pub mod enums;
pub mod events;
pub mod poller;
pub mod service;
pub mod structs;
pub mod submission;
pub mod transport;
