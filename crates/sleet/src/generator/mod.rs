mod config;
mod lock;
mod mutex;
mod state;
mod status;

pub use config::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use state::*;
pub use status::*;
