//! Type declarations and resolution.
//!
//! Editing code never looks at declarations directly; it goes through
//! [`TypeResolver`]. [`TypeTable`] is the in-memory implementation, filled
//! either by hand or from Java source via [`index_java_source`].

mod decl;
mod resolve;
mod scan;

pub use decl::{MethodDescriptor, TypeDecl, TypeKind, TypeReference, Visibility};
pub use resolve::{Declaration, TypeResolver, TypeTable};
pub use scan::index_java_source;
