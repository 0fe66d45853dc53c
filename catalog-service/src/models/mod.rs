//! Domain models for catalog-service.

mod branch;
mod document;
mod speciality;

pub use branch::Branch;
pub use document::Document;
pub use speciality::Speciality;
