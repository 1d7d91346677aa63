/// Broad failure category, used for exit codes and HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Training data is empty or every record is degenerate.
    DataInsufficient,
    /// A prediction request is missing, non-numeric or out of range.
    InvalidRequest,
    /// A loaded model fails its sanity checks.
    ModelCorrupt,
    /// A historical record violates its own invariants.
    InvalidData,
    Io,
    Config,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidRequest | ErrorKind::Io | ErrorKind::Config => 2,
            ErrorKind::DataInsufficient | ErrorKind::InvalidData => 3,
            ErrorKind::ModelCorrupt => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::DataInsufficient => "DataInsufficientError",
            ErrorKind::InvalidRequest => "InvalidRequestError",
            ErrorKind::ModelCorrupt => "ModelCorruptError",
            ErrorKind::InvalidData => "InvalidDataError",
            ErrorKind::Io => "IoError",
            ErrorKind::Config => "ConfigError",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn data_insufficient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataInsufficient, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn model_corrupt(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelCorrupt, message)
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidData, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_taxonomy_label() {
        let err = AppError::invalid_request("tamano must be > 0");
        assert_eq!(err.to_string(), "InvalidRequestError: tamano must be > 0");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::data_insufficient("x").exit_code(), 3);
        assert_eq!(AppError::model_corrupt("x").exit_code(), 4);
        assert_eq!(AppError::config("x").kind(), ErrorKind::Config);
    }
}
