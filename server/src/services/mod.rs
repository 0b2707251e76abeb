//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and generative-text logic so route
//! handlers stay focused on protocol translation, rate limiting and error
//! mapping.

pub mod generation;
pub mod lyrics;
pub mod seo;
pub mod survey;
