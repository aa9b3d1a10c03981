pub mod engine;
pub mod planner;
pub mod tracker;
