pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod fields;
pub mod filter;
pub mod logging;
pub mod models;
pub mod rpc;
pub mod session;

#[cfg(test)]
pub mod test_utils;
