use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ReportError, Result};

/// Opaque handle over the bearer authorization material for the reporting
/// API. Read-only after construction; refresh logic lives with whoever
/// minted the token.
#[derive(Clone)]
pub struct Credential {
    token: String,
}

#[derive(Deserialize)]
struct KeyFile {
    access_token: String,
}

impl Credential {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Load the handle from a JSON key file containing an `access_token`
    /// field. A file that cannot be read or parsed is an authentication
    /// defect, not a transport one.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ReportError::Authentication(format!("cannot read key file {}: {}", path.display(), e))
        })?;

        let key: KeyFile = serde_json::from_str(&contents).map_err(|e| {
            ReportError::Authentication(format!("malformed key file {}: {}", path.display(), e))
        })?;

        if key.access_token.trim().is_empty() {
            return Err(ReportError::Authentication(format!(
                "key file {} has an empty access_token",
                path.display()
            )));
        }

        Ok(Self {
            token: key.access_token,
        })
    }

    /// Value for the `Authorization: Bearer` header.
    pub(crate) fn bearer(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}
