mod phonebank;

pub use phonebank::{ApiErrorBody, ApiErrorObject, PhonebankError, UNAUTHORIZED_MESSAGE};
