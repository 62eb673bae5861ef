//! Common utilities for siderium.

mod bitgrid;

pub(crate) use bitgrid::BitGrid;
