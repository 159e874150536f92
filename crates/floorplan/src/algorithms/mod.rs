pub mod preprocessing;
pub mod lines;
pub mod walls;
pub mod rooms;
pub mod neural;

pub use preprocessing::*;
pub use lines::*;
pub use walls::*;
pub use rooms::*;
pub use neural::*;
