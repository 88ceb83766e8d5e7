pub mod day;
pub mod handles;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use day::*;
pub use handles::*;
pub use time::*;
