pub mod buildid;
pub mod config;
pub mod durable;
pub mod error;
pub mod index;
pub mod logging;
pub mod mirror;
pub mod remote;
