// src/pid.rs

//! # PID Compute Callbacks
//!
//! This module provides the compute callbacks and control data structures
//! the PID-based control stages hand to [`piddiy::PidController`].

pub mod rate;
pub use rate::*;
