//! Symbol demangler for the MSVC mangling scheme.
//!
//! ```
//! assert_eq!(symbols::msvc::demangle("?foo@@YAHH@Z").unwrap(), "int foo(int)");
//! ```

pub mod error;
pub mod msvc;

pub use error::{Diagnostic, Error};
