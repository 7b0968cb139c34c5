//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and persistence so route handlers stay
//! focused on protocol translation and status mapping.

pub mod diagram;
pub mod version;
