pub mod backfill;
pub mod clock;
pub mod dates;
pub mod error;
pub mod pg;
pub mod service;
pub mod status;
pub mod store;

#[cfg(test)]
pub mod memory;
