//! Custom `Error` and `Diagnostic` types for the demangler.

use std::fmt;

/// Errors that can occur while demangling a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// A number isn't a single digit or a run of `A`..`P` closed by `@`.
    BadNumber,

    /// An identifier isn't closed by `@` before the symbol ends.
    UnterminatedString,

    /// Found a back reference that is out-of-bounds of the name table.
    DanglingReference,

    /// Byte doesn't describe the access level of a member function.
    UnknownFunctionClass,

    /// Byte doesn't describe a supported calling convention.
    UnknownCallingConvention,

    /// Byte doesn't start any known type.
    UnknownPrimitiveType,

    /// An array was declared with zero or less dimensions.
    InvalidArrayDimension(i32),

    /// Storage class following an array's `$$C` marker isn't known.
    UnknownStorageClass,

    /// The symbol ends in the middle of a parameter or template argument list.
    UnterminatedParameterList,

    /// Encountered too much recursion when demangling symbol.
    RecursionLimit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::BadNumber => f.write_str("bad number"),
            Error::UnterminatedString => f.write_str("missing '@'"),
            Error::DanglingReference => f.write_str("name reference too large"),
            Error::UnknownFunctionClass => f.write_str("unknown func class"),
            Error::UnknownCallingConvention => f.write_str("unknown calling convention"),
            Error::UnknownPrimitiveType => f.write_str("unknown primitive type"),
            Error::InvalidArrayDimension(n) => write!(f, "invalid array dimension: {n}"),
            Error::UnknownStorageClass => f.write_str("unknown storage class"),
            Error::UnterminatedParameterList => f.write_str("unterminated parameter list"),
            Error::RecursionLimit => f.write_str("too much recursion"),
        }
    }
}

impl std::error::Error for Error {}

/// An [`Error`] together with the part of the symbol that wasn't consumed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: Error,
    pub rest: String,
}

impl Diagnostic {
    pub fn new(error: Error, rest: &str) -> Self {
        Self {
            error,
            rest: rest.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest.is_empty() {
            return fmt::Display::fmt(&self.error, f);
        }

        write!(f, "{}: {}", self.error, self.rest)
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
