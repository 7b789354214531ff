pub mod catalog;
pub mod console;
pub mod error;
pub mod moderation;

pub use error::WorkflowError;
