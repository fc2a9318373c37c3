pub mod schedule;
pub mod state;
