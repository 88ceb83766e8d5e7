pub mod angles;
pub mod mat4;
pub mod vec;

pub use angles::*;
pub use mat4::*;
pub use vec::*;
