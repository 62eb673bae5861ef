//! Test-only helpers: synthetic star fields with known ground truth.

pub(crate) mod synthetic;
