use std::fmt;

//------------ LineError -----------------------------------------------------

/// Errors returned while splitting an event line into its fields.
///
/// A malformed line is recoverable: the line is skipped and ingest goes
/// on. An unrecognized command is not. The producer and the engine must
/// agree on the command vocabulary, and a divergence means neither side
/// can tell what the rest of the stream means. See [LineError::is_fatal].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line did not split into at least a marker, a neighbor address
    /// and a command.
    TooFewFields { line: String },
    /// The command token is not part of the known vocabulary.
    UnrecognizedCommand { command: String, line: String },
}

impl LineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, LineError::UnrecognizedCommand { .. })
    }
}

impl std::error::Error for LineError {}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineError::TooFewFields { line } => {
                write!(f, "Error: did not split line into enough parts: [{}]", line)
            }
            LineError::UnrecognizedCommand { command, line } => write!(
                f,
                "FATAL: command not implemented: {} in line [{}]",
                command, line
            ),
        }
    }
}

//------------ RouteParseError -----------------------------------------------

/// Errors returned by the route attribute parser. All of these are
/// recoverable: the event is dropped, but still counts as processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteParseError {
    /// The payload ended inside a `[ ... ]` list.
    UnterminatedList,
    /// The payload ended inside a `( ... )` group.
    UnterminatedSkip,
    /// The payload ended after a key, without a value.
    MissingValue { key: String },
    /// A list was given for a key that does not take lists. Only
    /// `as-path` lists are understood.
    ListNotSupported { key: String },
    /// An AS-path element is not an unsigned 32-bit number.
    InvalidAsn { token: String },
    /// The mandatory `route` attribute is absent.
    MissingRoute,
    /// The `route` attribute is not a valid IPv4 CIDR.
    InvalidRoute { value: String },
    /// The `route` attribute is a valid prefix, but not an IPv4 one.
    NotIpv4 { value: String },
}

impl std::error::Error for RouteParseError {}

impl fmt::Display for RouteParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteParseError::UnterminatedList => {
                write!(f, "Error: route ends inside an attribute list.")
            }
            RouteParseError::UnterminatedSkip => {
                write!(f, "Error: route ends inside a parenthesized group.")
            }
            RouteParseError::MissingValue { key } => {
                write!(f, "Error: attribute '{}' has no value.", key)
            }
            RouteParseError::ListNotSupported { key } => write!(
                f,
                "Error: a list is only supported for as-path, not for '{}'.",
                key
            ),
            RouteParseError::InvalidAsn { token } => {
                write!(f, "Error: bad as-path element '{}'.", token)
            }
            RouteParseError::MissingRoute => {
                write!(f, "Error: route attribute is missing.")
            }
            RouteParseError::InvalidRoute { value } => {
                write!(f, "Error: could not parse prefix '{}'.", value)
            }
            RouteParseError::NotIpv4 { value } => {
                write!(f, "Error: prefix '{}' is not an IPv4 prefix.", value)
            }
        }
    }
}

//------------ PrefixStoreError ----------------------------------------------

/// Possible errors returned by methods on a prefix index. Only
/// [PrefixStoreError::FatalError] is unrecoverable.
#[derive(Debug, PartialEq, Eq)]
pub enum PrefixStoreError {
    /// The requested prefix was not found in the index.
    PrefixNotFound,
    /// A lock guarding the index was poisoned by a writer that panicked
    /// halfway through an update. The index is probably inconsistent and
    /// the application should terminate.
    FatalError,
}

impl std::error::Error for PrefixStoreError {}

impl fmt::Display for PrefixStoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PrefixStoreError::PrefixNotFound => {
                write!(f, "Error: The Prefix cannot be found.")
            }
            PrefixStoreError::FatalError => write!(f, "{}", FatalError),
        }
    }
}

impl From<FatalError> for PrefixStoreError {
    fn from(_: FatalError) -> Self {
        PrefixStoreError::FatalError
    }
}

//------------ FatalError ----------------------------------------------------

/// An unrecoverable error, raised when a lock is found poisoned. All data
/// behind that lock should be considered corrupt and the application
/// receiving this error should probably terminate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FatalError;

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error: A Fatal error has occurred. The store must be considered \
             corrupted. The application should terminate."
        )
    }
}

pub type FatalResult<T> = Result<T, FatalError>;

impl std::error::Error for FatalError {}

impl<T> From<std::sync::PoisonError<T>> for FatalError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        FatalError
    }
}

//------------ IngestError ---------------------------------------------------

/// Conditions that end ingestion with an error. Everything recoverable is
/// handled inside the dispatch loop and never shows up here.
#[derive(Debug)]
pub enum IngestError {
    /// The producer sent a command outside the known vocabulary.
    UnrecognizedCommand { command: String, line: String },
    /// Reading the event stream failed.
    Io(std::io::Error),
    Fatal(FatalError),
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(err) => Some(err),
            IngestError::Fatal(err) => Some(err),
            IngestError::UnrecognizedCommand { .. } => None,
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IngestError::UnrecognizedCommand { command, line } => write!(
                f,
                "FATAL: command not implemented: {} in line [{}]",
                command, line
            ),
            IngestError::Io(err) => {
                write!(f, "Error: reading the event stream failed: {}", err)
            }
            IngestError::Fatal(err) => err.fmt(f),
        }
    }
}

impl From<FatalError> for IngestError {
    fn from(value: FatalError) -> Self {
        IngestError::Fatal(value)
    }
}

impl From<std::io::Error> for IngestError {
    fn from(value: std::io::Error) -> Self {
        IngestError::Io(value)
    }
}

//------------ QueryError ----------------------------------------------------

/// Validation failures for queries handed in as text by a boundary layer.
/// Unknown neighbors and unknown ASNs are not errors, they produce empty
/// results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Not an IPv4 address.
    InvalidAddress { value: String },
    /// Not an unsigned 32-bit AS number.
    InvalidAsn { value: String },
    Fatal(FatalError),
}

impl std::error::Error for QueryError {}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryError::InvalidAddress { value } => {
                write!(f, "Error: bad IP address '{}'.", value)
            }
            QueryError::InvalidAsn { value } => {
                write!(f, "Error: could not parse AS number '{}'.", value)
            }
            QueryError::Fatal(err) => err.fmt(f),
        }
    }
}

impl From<FatalError> for QueryError {
    fn from(value: FatalError) -> Self {
        QueryError::Fatal(value)
    }
}
