//! API Routes
//!
//! Route handlers organized by functionality.

pub mod events;
pub mod feedback;
pub mod health;
pub mod insights;
pub mod subjects;
