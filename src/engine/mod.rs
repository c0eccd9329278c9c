pub mod analysis;
pub mod render;
pub mod stats;
