//! Traffic Grid Library
//!
//! A live road network model with congestion-aware routing and traffic signal
//! control, plus the simulation loop that keeps it moving.

pub mod config;
pub mod network;
pub mod service;
