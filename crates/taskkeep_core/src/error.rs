use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    Validation(String),
    OutOfRange(String),
    CorruptData(String),
    Format(String),
    InvalidArgument(String),
    Io(String),
}

impl TaskError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn out_of_range<M: Into<String>>(message: M) -> Self {
        Self::OutOfRange(message.into())
    }

    pub fn corrupt_data<M: Into<String>>(message: M) -> Self {
        Self::CorruptData(message.into())
    }

    pub fn format<M: Into<String>>(message: M) -> Self {
        Self::Format(message.into())
    }

    pub fn invalid_argument<M: Into<String>>(message: M) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::OutOfRange(_) => "out_of_range",
            Self::CorruptData(_) => "corrupt_data",
            Self::Format(_) => "format",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::OutOfRange(message) => message,
            Self::CorruptData(message) => message,
            Self::Format(message) => message,
            Self::InvalidArgument(message) => message,
            Self::Io(message) => message,
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for TaskError {}
