pub mod driver;
pub mod mesh;
pub mod renderer;
pub mod shading;

pub use driver::*;
pub use mesh::*;
pub use renderer::*;
pub use shading::*;
