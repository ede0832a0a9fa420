pub mod components;
pub mod frame_clock;
pub mod panels;
