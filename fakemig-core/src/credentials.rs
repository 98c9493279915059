use crate::Password;

/// Password used when the operator neither supplies nor is asked for one.
pub const DEFAULT_PASSWORD: &str = "root";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read password: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Interactive source of a password, implemented by the command line layer.
pub trait PasswordPrompt {
    fn prompt(&self, message: &str) -> std::io::Result<String>;
}

/// Where the database password comes from.
///
/// Resolved once, before any connection is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    Explicit(String),
    Prompted,
    #[default]
    Default,
}

impl Credentials {
    pub fn resolve(&self, prompt: &dyn PasswordPrompt) -> Result<Password, CredentialError> {
        match self {
            Self::Explicit(value) => Ok(Password::new(value.as_str())),
            Self::Default => Ok(Password::new(DEFAULT_PASSWORD)),
            Self::Prompted => {
                let value = prompt.prompt("Database password: ")?;

                if value.is_empty() {
                    tracing::debug!("empty password entered, using default");
                    return Ok(Password::new(DEFAULT_PASSWORD));
                }

                Ok(Password::new(value))
            }
        }
    }
}
