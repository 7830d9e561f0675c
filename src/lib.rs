// src/lib.rs

//! # Multirotor Flight-Control Core
//!
//! This crate provides a `no_std` flight-control core for small multirotors.
//! It fuses periodic attitude and angular-rate estimates into a
//! [`FlightState`], runs a safety-gated arm/disarm/failsafe state machine,
//! passes pilot demands through an ordered pipeline of pluggable
//! [`ControlStage`]s, and answers MSP telemetry and configuration requests
//! over a byte stream.
//!
//! Hardware is reached only through collaborator traits ([`Board`],
//! [`Receiver`], [`Mixer`], [`Sensor`]) that an integrator implements for a
//! particular target and hands to [`FlightController::new`]. The controller
//! is driven by calling [`FlightController::update`] from the main loop.

#![no_std]
#![deny(missing_docs)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod board;
pub mod controller;
pub mod datatypes;
pub mod error;
pub mod mixer;
pub mod msp;
pub mod pid;
pub mod receiver;
pub mod sensor;
pub mod stage;

#[doc(inline)]
pub use board::{Board, BoardError};
#[doc(inline)]
pub use controller::{FlightController, FlightControllerConfig};
#[doc(inline)]
pub use datatypes::{Demands, FlightState};
#[doc(inline)]
pub use error::FlightError;
#[doc(inline)]
pub use mixer::{Mixer, Motors, QuadXMixer};
#[doc(inline)]
pub use receiver::Receiver;
#[doc(inline)]
pub use sensor::Sensor;
#[doc(inline)]
pub use stage::*;

#[cfg(test)]
mod test_utils;
