use std::fmt;

/// Errors raised while reading a migration identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("migration `{0}` must look like `<version>_<name>`")]
    Malformed(String),

    #[error("migration version must not be empty")]
    EmptyVersion,

    #[error("migration name must not be empty")]
    EmptyName,
}

/// Identifies one entry of the migration ledger.
///
/// `version` is the unique key of a ledger row; `name` is informational and
/// never used to match rows. Keys written by the fake operations carry the
/// `synthetic` tag so an audit can tell them apart from real migration runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationKey {
    version: String,
    name: String,
    synthetic: bool,
}

impl MigrationKey {
    pub fn new(version: impl Into<String>, name: impl Into<String>) -> Result<Self, KeyError> {
        let version = version.into();
        let name = name.into();

        if version.is_empty() {
            return Err(KeyError::EmptyVersion);
        }

        if name.is_empty() {
            return Err(KeyError::EmptyName);
        }

        Ok(Self {
            version,
            name,
            synthetic: false,
        })
    }

    /// Reads a migration file name such as `20171018082229_scheduler_migrations`.
    ///
    /// The version is everything before the first underscore, the name is the
    /// rest (which may contain more underscores).
    pub fn parse(value: &str) -> Result<Self, KeyError> {
        let Some((version, name)) = value.trim().split_once('_') else {
            return Err(KeyError::Malformed(value.to_owned()));
        };

        Self::new(version, name)
    }

    /// Tags the key as written by fakemig rather than by a real migration run.
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl fmt::Display for MigrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.version, self.name)
    }
}
