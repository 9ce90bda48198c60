//! Providers shipped in-tree: a scripted mock for tests, a
//! capability-absent probe, and a line-oriented stdin provider for the
//! console demo.

pub mod mock;
pub mod stdin;
pub mod unsupported;

pub use mock::{MockProvider, MockProviderConfig};
pub use stdin::StdinProvider;
pub use unsupported::UnsupportedProvider;
