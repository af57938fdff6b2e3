pub mod control;
pub mod drivers;
pub mod event;
pub mod frame;
pub mod level;
pub mod save;
pub mod scores;
pub mod step;
pub mod world;
