pub mod scheduler;
pub mod updater;
