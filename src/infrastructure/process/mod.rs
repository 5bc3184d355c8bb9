pub mod launcher;
pub mod system;
