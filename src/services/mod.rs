//! Service layer for survclass business logic.
//!
//! This module contains domain logic separated from UI concerns.

pub mod annotate;

pub use annotate::{AnnotationEvent, AnnotationResult, AnnotationService};
