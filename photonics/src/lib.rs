//! Photonic layout generation for grating-coupled test structures.
//!
//! Devices are built by chaining waveguide [parts] port to port inside layout
//! [`Cell`](layout::cell::Cell)s, packed into a grid, and exported to GDSII.

pub mod deps;
pub mod devices;
pub mod error;
pub mod layout;
pub mod parts;
pub mod pdk;

pub(crate) mod log;
#[cfg(test)]
pub(crate) mod test_util;
