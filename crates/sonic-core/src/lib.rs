pub mod audio;
pub mod config;
pub mod constants;
pub mod contour;
pub mod controller;
pub mod field;
pub mod hud;
pub mod proximity;
pub mod render;
pub mod species;

pub use audio::*;
pub use config::*;
pub use contour::{LevelStyle, Segment};
pub use controller::*;
pub use field::*;
pub use hud::{DepthReadout, OceanLayer};
pub use proximity::*;
pub use species::*;
