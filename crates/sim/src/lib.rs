//! Agents, jobs and the per-tick scheduler driving the homestead world.

mod agent;
mod config;
mod job;
mod jobs;
mod movement;
mod scheduler;
mod simulation;
mod updates;
mod world;

pub use agent::*;
pub use config::*;
pub use job::*;
pub use movement::*;
pub use scheduler::*;
pub use simulation::*;
pub use updates::*;
pub use world::*;
