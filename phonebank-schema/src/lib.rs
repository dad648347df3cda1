pub mod admin;
pub mod dispatch;
pub mod pages;

pub use admin::{CsvUploadForm, FormKeyForm, UserMethodForm};
pub use dispatch::{ClaimResponse, NO_NUMBER_MESSAGE, RecordResponseForm};
pub use pages::{AdminPage, HomePage, RecipientSummary};
