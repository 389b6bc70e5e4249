//! URL handling module
//!
//! This module provides loose seed validation, host extraction and the
//! domain-scope predicates used to decide which links are followed.

mod domain;
mod scope;
mod validate;

pub use domain::extract_host;
pub use scope::{DomainScope, SameHostScope, ScopeKind, SubstringScope};
pub use validate::{is_url, validate_seed};
