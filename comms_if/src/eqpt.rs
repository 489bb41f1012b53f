//! # Equipment Interface
//!
//! This module defines the interface structures which will be sent to equipment drivers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Shooter (flywheel, intake and transfer wheel) demands
pub mod shooter;
