pub mod posted_registry;

pub use posted_registry::PostedRegistry;
