pub mod args;
pub mod autocomplete;
pub mod check;
pub mod config;
pub mod deploy;
pub mod flush;
pub mod init;
pub mod sources;
pub mod start;
pub mod wallet;
