pub mod deployer;
pub mod frontend;
pub mod funding;
pub mod local_chain;
pub mod network;
pub mod registry;
pub mod sources;
pub mod wallet;
