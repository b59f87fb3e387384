/// Filesystem line transport.
pub mod fs;

pub use fs::LineStream;
