//! Maps every third-party error type this crate touches to a short, stable
//! diagnostic name. Used by [`crate::api::error::ApiError`] to build the
//! `name` field of the JSON error envelope without a giant hand-written
//! match in the handler layer.

pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

impl ErrorKind for diesel::result::DatabaseErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::CheckViolation => "CheckViolation",
            Self::ClosedConnection => "ClosedConnection",
            Self::ForeignKeyViolation => "ForeignKeyViolation",
            Self::NotNullViolation => "NotNullViolation",
            Self::ReadOnlyTransaction => "ReadOnlyTransaction",
            Self::SerializationFailure => "SerializationFailure",
            Self::UnableToSendCommand => "UnableToSendCommand",
            Self::UniqueViolation => "UniqueViolation",
            _ => "UnknownDatabaseError",
        }
    }
}

impl ErrorKind for diesel::result::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyInTransaction => "AlreadyInTransaction",
            Self::BrokenTransactionManager => "BrokenTransactionManager",
            Self::DatabaseError(err, _) => err.kind(),
            Self::DeserializationError(_) => "DeserializationError",
            Self::InvalidCString(_) => "InvalidCString",
            Self::NotFound => "RowNotFound",
            Self::NotInTransaction => "NotInTransaction",
            Self::QueryBuilderError(_) => "QueryBuilderError",
            Self::RollbackErrorOnCommit { rollback_error, .. } => rollback_error.kind(),
            Self::RollbackTransaction => "RollbackTransaction",
            Self::SerializationError(_) => "SerializationError",
            _ => "UnknownQueryError",
        }
    }
}

impl ErrorKind for diesel::ConnectionError {
    fn kind(&self) -> &'static str {
        match self {
            Self::BadConnection(_) => "BadConnection",
            Self::CouldntSetupConfiguration(err) => err.kind(),
            Self::InvalidCString(_) => "InvalidCString",
            Self::InvalidConnectionUrl(_) => "InvalidConnectionUrl",
            _ => "UnknownDatabaseConnectionError",
        }
    }
}

impl ErrorKind for diesel::r2d2::PoolError {
    fn kind(&self) -> &'static str {
        "ConnectionPoolExhausted"
    }
}

impl ErrorKind for std::env::VarError {
    fn kind(&self) -> &'static str {
        match self {
            Self::NotPresent => "EnvironmentVariableNotPresent",
            Self::NotUnicode(_) => "EnvironmentVariableNotUnicode",
        }
    }
}

impl ErrorKind for std::num::IntErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "EmptyValue",
            Self::InvalidDigit => "InvalidDigit",
            Self::PosOverflow => "PositiveOverflow",
            Self::NegOverflow => "NegativeOverflow",
            Self::Zero => "ZeroNotAllowed",
            _ => "UnknownIntParseError",
        }
    }
}

impl ErrorKind for std::num::ParseIntError {
    fn kind(&self) -> &'static str {
        self.kind().kind()
    }
}

impl ErrorKind for std::io::ErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "FileNotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::ConnectionRefused => "ConnectionRefused",
            Self::ConnectionReset => "ConnectionReset",
            Self::ConnectionAborted => "ConnectionAborted",
            Self::NotConnected => "NotConnected",
            Self::TimedOut => "TimedOut",
            Self::UnexpectedEof => "UnexpectedEof",
            Self::InvalidData => "InvalidData",
            Self::InvalidInput => "InvalidInput",
            Self::Interrupted => "Interrupted",
            Self::WriteZero => "WriteZero",
            Self::Other => "OtherIoError",
            _ => "UnknownIoError",
        }
    }
}

impl ErrorKind for std::io::Error {
    fn kind(&self) -> &'static str {
        self.kind().kind()
    }
}

impl ErrorKind for reqwest::Error {
    fn kind(&self) -> &'static str {
        if self.is_timeout() {
            "RequestTimeout"
        } else if self.is_connect() {
            "ConnectionFailed"
        } else if self.is_decode() {
            "ResponseDecodeFailed"
        } else if self.is_status() {
            "UnexpectedStatus"
        } else if self.is_body() {
            "RequestBodyError"
        } else {
            "UnknownRequestError"
        }
    }
}

impl ErrorKind for serde_json::error::Category {
    fn kind(&self) -> &'static str {
        match self {
            Self::Io => "JsonIoError",
            Self::Syntax => "JsonInvalidSyntax",
            Self::Data => "JsonInvalidData",
            Self::Eof => "JsonUnexpectedEOF",
        }
    }
}

impl ErrorKind for serde_json::Error {
    fn kind(&self) -> &'static str {
        self.classify().kind()
    }
}

impl ErrorKind for axum::extract::rejection::JsonRejection {
    fn kind(&self) -> &'static str {
        match self {
            Self::JsonDataError(_) => "JsonDataError",
            Self::JsonSyntaxError(_) => "JsonSyntaxError",
            Self::MissingJsonContentType(_) => "MissingJsonContentType",
            Self::BytesRejection(_) => "BytesRejection",
            _ => "UnknownJsonRejectionError",
        }
    }
}

impl ErrorKind for axum::extract::rejection::QueryRejection {
    fn kind(&self) -> &'static str {
        match self {
            Self::FailedToDeserializeQueryString(_) => "FailedToDeserializeQueryString",
            _ => "UnknownQueryRejectionError",
        }
    }
}

impl ErrorKind for axum::extract::rejection::PathRejection {
    fn kind(&self) -> &'static str {
        match self {
            Self::FailedToDeserializePathParams(_) => "PathDeserializeError",
            Self::MissingPathParams(_) => "MissingPathParams",
            _ => "UnknownPathRejectionError",
        }
    }
}

impl ErrorKind for crate::resilience::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::CircuitOpen { .. } => "CircuitOpen",
            Self::Request(err) => err.kind(),
            Self::Status(_) => "UpstreamErrorStatus",
        }
    }
}

impl ErrorKind for crate::pds::ParseError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Io(err) => err.kind(),
            Self::UnknownFieldCount(_) => "UnknownFieldCount",
        }
    }
}

impl ErrorKind for crate::scraper::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::Resilience(err) => err.kind(),
            Self::Json(err) => err.kind(),
            Self::Parse(err) => err.kind(),
            Self::Query(err) => err.kind(),
        }
    }
}

impl ErrorKind for crate::query::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::Query(err) => err.kind(),
            Self::UnknownRover(_) => "UnknownRover",
            Self::MissingDateSelector => "MissingDateSelector",
            Self::InvalidSort(_) => "InvalidSort",
            Self::InvalidPage => "InvalidPage",
            Self::CompareRangeTooLarge { .. } => "CompareRangeTooLarge",
        }
    }
}
