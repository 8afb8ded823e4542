//! Command tokens and message classification.

mod classified;
mod kind;
mod types;

pub use self::classified::ClassifiedMessage;
pub use self::kind::MessageKind;
pub use self::types::Command;
