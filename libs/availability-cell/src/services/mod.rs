pub mod client;

pub use client::{AvailabilityClient, HttpAvailabilityClient};
