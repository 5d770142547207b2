//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own file I/O and data formats so route handlers can stay
//! focused on protocol translation and status mapping.

pub mod pddl;
pub mod scenes;
pub mod trajectory;
