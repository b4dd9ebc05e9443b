pub mod booking;
pub mod date_resolver;
pub mod form;
pub mod prompts;
pub mod text;
pub mod time_matcher;
pub mod validators;

pub use booking::BookingFinalizer;
pub use date_resolver::{DateResolver, ResolvedDate};
pub use form::FormStateMachine;
pub use time_matcher::TimeChoiceMatcher;
pub use validators::{FieldOutcome, FieldValidator, ValidationInput, Verdict};
