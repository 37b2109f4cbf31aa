pub mod camera;
pub mod controls;
pub mod simulation;
pub mod trails;
pub mod visualization;
