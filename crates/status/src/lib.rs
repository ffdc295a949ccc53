//! Driving Status and Lifecycle
//!
//! Derives the status color from alerts, pedals and cruise state, and
//! detects onroad/offroad transitions.

mod controller;

pub use controller::{derive_status, select_camera, StatusController, Transition};
