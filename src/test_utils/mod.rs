//! Helpers shared by unit tests and the integration suite.
//!
//! Compiled for `cfg(test)` and for the `test-util` feature, which the crate
//! enables for its own integration tests through a self dev-dependency.

mod collecting_sink;
mod mock_loki;
mod shared_buffer;

pub use collecting_sink::CollectingSink;
pub use mock_loki::{CapturedRequest, MockLokiServer, unreachable_url};
pub use shared_buffer::SharedBuf;
