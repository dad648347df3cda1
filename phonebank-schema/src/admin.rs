//! Form payloads posted from the admin page.

use serde::{Deserialize, Serialize};

/// POST /admin body.
///
/// The upload is free text: rows are separated by whitespace and only the
/// first CSV column of each row is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvUploadForm {
    #[serde(rename = "phone-number-csv", default)]
    pub phone_number_csv: Option<String>,
}

/// POST /formmethod body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormKeyForm {
    #[serde(default)]
    pub form_key: Option<String>,
}

/// POST /usermethod body. Both fields may be present in one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMethodForm {
    #[serde(default)]
    pub add_email: Option<String>,
    #[serde(default)]
    pub delete_email: Option<String>,
}
