//! Strongly typed physical quantities for population synthesis.
//!
//! All quantities are `f64` newtypes in astronomer-friendly base units:
//! solar masses, years and solar luminosities.

pub mod luminosity;
pub mod mass;
pub mod time;

#[cfg(test)]
mod mass_test;

pub use luminosity::{Luminosity, SOLAR_LUMINOSITY_ERG_S};
pub use mass::{Mass, SOLAR_MASS_G};
pub use time::{SECONDS_PER_YEAR, Time};
