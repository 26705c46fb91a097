mod runtime;
mod sleep_provider;
mod snowflake;

pub use runtime::*;
pub use sleep_provider::*;
pub use snowflake::*;
