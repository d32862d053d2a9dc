pub mod actions;
pub mod constants;
pub mod render;
