//! Service layer

pub mod containment;

pub use containment::ContainmentService;
