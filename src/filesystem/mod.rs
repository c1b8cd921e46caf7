//! In-memory virtual filesystem.
//!
//! A [`tree::Tree`] is built once from a serialized source and wrapped in a
//! [`Vfs`] handle that tracks the working directory and resolves paths against
//! it.

pub mod decode;
pub mod navigator;
pub mod node;
pub mod path;
pub mod source;
pub mod tree;

pub use navigator::{Vfs, VfsError};
pub use source::{SourceError, SourceFormat};
