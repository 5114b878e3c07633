//! Instance factory adapters.

pub mod catalog;

pub use catalog::CatalogInstanceFactory;
