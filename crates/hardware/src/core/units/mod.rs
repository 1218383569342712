//! Execution units and functional components.
//!
//! This module contains the fixed-latency units the stage sequencer drives.

/// Floating-point units for the stage operations.
pub mod fpu;
