//! Command implementations for the embed CLI
//!
//! Each command lives in its own submodule and writes to an injected writer
//! so tests can capture output.

mod flush;
mod forget;
mod request;

pub use flush::execute as flush_cache;
pub use forget::execute as forget_content;
pub use request::{build_request, execute as request_content};
