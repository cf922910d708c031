pub use artifacts::*;
pub use consts::*;
pub use deployment::*;
pub use env::*;
pub use inputs::*;
pub use scaffold::*;
pub use settings::*;

mod artifacts;
mod consts;
mod deployment;
mod env;
mod inputs;
mod scaffold;
mod settings;

pub mod traits;
