pub mod cli;
pub mod config;
pub mod export;
pub mod roster;
pub mod server;
pub mod stats;
pub mod storage;
pub mod taxonomy;
pub mod tracker;
