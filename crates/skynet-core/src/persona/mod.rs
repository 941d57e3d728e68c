//! Persona catalog for SkyNet.
//!
//! The catalog is an immutable lookup table loaded once at startup.

pub mod catalog;

pub use catalog::PersonaCatalog;
