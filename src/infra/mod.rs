pub mod console;
pub mod image_probe;
pub mod sheets;
