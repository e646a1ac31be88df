pub mod commands;
pub mod renderer;
pub mod store;

pub use commands::{CommandRecorder, FitOptions, MapCommand};
pub use renderer::LayerRenderer;
pub use store::LayerSlotStore;
