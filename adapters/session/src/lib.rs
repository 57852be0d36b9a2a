#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer-driven drivers that pump Touchline worlds and systems.
//!
//! A session owns one world, the systems that react to it and the injected
//! store. Callers feed it input and elapsed time; the session applies
//! commands, lets systems answer the resulting events and repeats until the
//! world goes quiet.

mod city;
mod farm;
mod shootout;

pub use city::CitySession;
pub use farm::FarmSession;
pub use shootout::ShootoutSession;

/// Store key holding the saved city layout.
pub const CITY_LAYOUT_KEY: &str = "city.layout";
/// Store key holding the saved farm plots.
pub const FARM_LAYOUT_KEY: &str = "farm.layout";
