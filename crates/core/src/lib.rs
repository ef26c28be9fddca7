#![forbid(unsafe_code)]

pub mod intervals;
pub mod model;
pub mod time;

pub use time::Clock;
