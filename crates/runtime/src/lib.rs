pub mod day_advance;
pub mod drag;
pub mod event_bus;
pub mod frame;
pub mod interaction;

pub use day_advance::*;
pub use drag::*;
pub use event_bus::*;
pub use frame::*;
pub use interaction::*;
