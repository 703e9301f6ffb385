pub mod event;
pub mod frame;
pub mod hazard;
pub mod level;
pub mod progress;
pub mod step;
pub mod world;
