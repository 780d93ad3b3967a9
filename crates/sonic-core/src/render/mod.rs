pub mod compositor;
pub mod markers;
pub mod raster;
pub mod scene;
pub mod surface;

pub use compositor::Compositor;
pub use markers::{SonarBurst, VisualPings};
pub use raster::Raster;
pub use scene::{draw_contours, ContourStats};
pub use surface::{Rgba, Surface};
