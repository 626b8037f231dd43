pub mod classify;
pub mod prompt;
pub mod router;

pub use classify::{classify_message, Condition, Intent};
pub use router::{IntentRouter, TurnReply};
