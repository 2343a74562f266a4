pub mod batch;
pub mod simulator;
pub mod tracker;
