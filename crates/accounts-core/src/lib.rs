pub mod config;
pub mod logging;

pub mod account;
pub mod client;
pub mod request;
pub mod retry;
pub mod status;
pub mod transport;
