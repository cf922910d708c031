pub use self::{autocomplete::*, deploy::*, flush::*, project::*, sources::*, start::*};

mod autocomplete;
mod deploy;
mod flush;
mod project;
mod sources;
mod start;
