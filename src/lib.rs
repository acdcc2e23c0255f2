//! Space invader: a fixed-timestep arcade simulation.
//!
//! `round` is the entry point for hosts; `compute` holds the pure rules it
//! runs on.

pub mod compute;
pub mod config;
pub mod entities;
pub mod host;
pub mod round;
pub mod schedule;
