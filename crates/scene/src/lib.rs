pub mod camera;
pub mod globe;
pub mod markers;
pub mod rows;

pub use camera::*;
pub use globe::*;
pub use markers::*;
pub use rows::*;
