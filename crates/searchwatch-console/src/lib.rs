/*
[INPUT]:  Public API exports for searchwatch-console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod board;
pub mod config;
pub mod preview;
pub mod render;
pub mod schedule;
pub mod wizard;

// Re-export main types for convenience
pub use board::{BoardError, Freshness, TaskBoard, TaskFilter, TaskSort};
pub use config::ConsoleConfig;
pub use preview::PreviewOutcome;
pub use wizard::{TaskSink, TaskWizard, WizardError, WizardStep};
