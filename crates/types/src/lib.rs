mod address;
mod contract;
mod contract_source;
mod decimal;
mod framework;
mod network;

pub use address::*;
pub use contract::*;
pub use contract_source::*;
pub use decimal::*;
pub use framework::*;
pub use network::*;
