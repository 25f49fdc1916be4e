mod action_record;
mod warning_record;

pub use action_record::{ActionKind, ActionRecord, NewAction};
pub use warning_record::WarningRecord;
