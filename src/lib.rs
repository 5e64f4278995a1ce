// Export modules for use in tests
pub mod catalog;
pub mod panic_handler;
pub mod pdf;
pub mod settings;
pub mod theme;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the viewer entry points
pub use catalog::{Catalog, Chapter};
pub use viewer::{AppContext, Effect, Message, Viewer};
