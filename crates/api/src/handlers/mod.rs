pub mod dream;
pub mod video;
