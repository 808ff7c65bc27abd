use serde::{Deserialize, Serialize};

/// User reported as signed in by the authentication collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// National identifier stored on the profile, if any.
    #[serde(default)]
    pub rut: Option<String>,
    /// Phone number stored on the profile, if any.
    #[serde(default)]
    pub phone: Option<String>,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into().to_lowercase(),
            rut: None,
            phone: None,
        }
    }

    #[must_use]
    pub fn with_rut(mut self, rut: impl Into<String>) -> Self {
        self.rut = Some(rut.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
