use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Member not found: {0}")]
    MemberNotFound(u64),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    /// Platform-side failures are recovered locally: the enforcement record
    /// is kept and the error only shows up in the mod-log. Everything else
    /// propagates to the caller.
    pub fn is_platform(&self) -> bool {
        matches!(
            self,
            Error::Serenity(_) | Error::PermissionDenied(_) | Error::MemberNotFound(_)
        )
    }
}
