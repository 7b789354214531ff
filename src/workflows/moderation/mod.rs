//! Moderation of private listings submitted by third parties.

pub mod domain;
pub mod workflow;

pub use domain::{ListingId, ListingStatus, ModerationDecision, PrivateListing};
pub use workflow::{ModerationWorkflow, TransitionReceipt};
