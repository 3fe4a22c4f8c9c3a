use serde::Deserialize;

/// Form body shared by `/login` and `/join`.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub id: String,
    pub pw: String,
}
