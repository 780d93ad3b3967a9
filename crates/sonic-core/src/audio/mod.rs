pub mod backend;
pub mod mixer;
pub mod ping;
pub mod schedule;
pub mod session;
pub mod voices;

pub use backend::*;
pub use mixer::{LayerState, ZoneLayer, ZoneMixer};
pub use ping::PingSynth;
pub use schedule::{Scheduler, TimerId};
pub use session::AudioSession;
pub use voices::midi_to_hz;
