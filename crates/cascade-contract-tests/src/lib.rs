#![forbid(unsafe_code)]

//! Contract tests for the cascade pipeline.
//!
//! Everything here drives the public contracts through [`fake::FakeContext`];
//! no GPU, GL context, or window is involved.

pub mod fake;
pub mod support;

#[cfg(test)]
mod chain;
#[cfg(test)]
mod config_fixtures;
#[cfg(test)]
mod lifecycle;
