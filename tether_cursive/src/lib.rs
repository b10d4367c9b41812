//! A home screen wired through `tether_reactive`: a knock button and two
//! switches drive a greeting message and the lights switch enablement.

pub mod controller;
pub mod logic;

pub use crate::logic::{HomeController, HomeLogic};
