pub mod clock;
pub mod source;
pub mod types;
pub mod window;
