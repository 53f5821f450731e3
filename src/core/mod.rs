//! Shared time axes and world-space types

pub mod coordinates;
pub mod space;
