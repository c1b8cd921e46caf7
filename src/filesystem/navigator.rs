//! Current-directory tracking and path resolution over a built [`Tree`].
//!
//! Note on `..`: it does not ascend to the parent. Any `..` segment sends
//! resolution back to the root, so `/a/b/..` and `..` from anywhere both land
//! on `/`. Segments after it are resolved from the root again.

use std::path::Path;

use snafu::prelude::*;
use tracing::debug;

use super::decode::decode_content;
use super::node::{Node, NodeId};
use super::path::{self, ROOT};
use super::source::{self, SourceError, SourceFormat};
use super::tree::Tree;

/// A loaded filesystem together with its working-directory cursor.
///
/// `cwd` and `cwd_path` always change together: resolving `cwd_path` from the
/// root yields `cwd`, and `cwd` is a directory.
#[derive(Debug, Clone)]
pub struct Vfs {
    tree: Tree,
    cwd: NodeId,
    cwd_path: String,
}

impl Vfs {
    pub fn new(tree: Tree) -> Self {
        let root = tree.root();
        Self {
            tree,
            cwd: root,
            cwd_path: ROOT.to_string(),
        }
    }

    pub async fn load(file_path: &Path, format: SourceFormat) -> Result<Self, SourceError> {
        source::load(file_path, format).await.map(Self::new)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// Resolves `target` to a node and its normalized absolute path.
    ///
    /// Relative paths are resolved by prefixing the current path and walking
    /// from the root, never from the cursor node itself.
    pub fn resolve(&self, target: &str) -> Result<(NodeId, String), VfsError> {
        let relative_base = if path::is_absolute(target) {
            ""
        } else {
            self.cwd_path.as_str()
        };
        let segments = relative_base
            .split(path::SEPARATOR)
            .chain(target.split(path::SEPARATOR));

        let mut current = self.tree.root();
        let mut resolved = ROOT.to_string();
        for segment in segments {
            match segment {
                "" | "." => {}
                ".." => {
                    current = self.tree.root();
                    resolved = ROOT.to_string();
                }
                name => {
                    current = self
                        .tree
                        .child(current, name)
                        .context(NotFoundSnafu { segment: name })?;
                    resolved = path::join(&resolved, name);
                }
            }
        }

        Ok((current, resolved))
    }

    pub fn pwd(&self) -> &str {
        &self.cwd_path
    }

    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    /// Changes the working directory and returns the new path. State is left
    /// untouched on failure.
    pub fn cd(&mut self, target: &str) -> Result<&str, VfsError> {
        let (id, resolved) = self.resolve(target)?;
        ensure!(
            self.tree.node(id).is_directory(),
            NotADirectorySnafu { path: target }
        );

        debug!(
            "Changing directory {} ({}) -> {} ({})",
            self.cwd_path,
            self.cwd(),
            resolved,
            id
        );
        self.cwd = id;
        self.cwd_path = resolved;
        Ok(&self.cwd_path)
    }

    /// Lists `target`. A file lists as its own name. Directory entries carry a
    /// trailing separator, and any directory other than the root starts with
    /// `.` and `..`.
    pub fn ls(&self, target: &str) -> Result<Vec<String>, VfsError> {
        let (id, _) = self.resolve(target)?;
        let node = self.tree.node(id);
        let Some(children) = node.children() else {
            return Ok(vec![node.name().to_string()]);
        };

        let mut entries = Vec::with_capacity(children.len() + 2);
        if id != self.tree.root() {
            entries.extend([".".to_string(), "..".to_string()]);
        }
        entries.extend(children.iter().map(|(name, &child)| {
            if self.tree.node(child).is_directory() {
                format!("{name}{}", path::SEPARATOR)
            } else {
                name.clone()
            }
        }));
        Ok(entries)
    }

    /// Creates an empty file at `target`. Touching an existing file is a
    /// no-op; touching an existing directory fails.
    pub fn touch(&mut self, target: &str) -> Result<(), VfsError> {
        let (parent_part, name) = path::split_parent(target);
        let parent_part = if parent_part.is_empty() { "." } else { parent_part };
        ensure!(
            !matches!(name, "" | "." | ".."),
            InvalidFileNameSnafu { path: target }
        );

        let (parent, _) = self
            .resolve(parent_part)
            .context(ParentUnreachableSnafu { path: parent_part })?;
        ensure!(
            self.tree.node(parent).is_directory(),
            ParentNotDirectorySnafu { path: parent_part }
        );

        if let Some(existing) = self.tree.child(parent, name) {
            ensure!(
                !self.tree.node(existing).is_directory(),
                CannotTouchDirectorySnafu { path: target }
            );
            return Ok(());
        }

        debug!("Creating empty file {}", target);
        self.tree
            .attach(parent, Node::file(name, ""))
            .context(ParentNotDirectorySnafu { path: parent_part })?;
        Ok(())
    }

    /// Returns a file's decoded text. Content that is not valid base64 is
    /// returned verbatim; only directories are an error.
    pub fn decode_file(&self, id: NodeId) -> Result<String, VfsError> {
        let node = self.tree.node(id);
        let content = node.content().context(IsADirectorySnafu {
            path: node.name(),
        })?;
        Ok(decode_content(content).into_owned())
    }
}

#[derive(Debug, Snafu)]
pub enum VfsError {
    #[snafu(display("no such file or directory: {}", segment))]
    NotFound { segment: String },
    #[snafu(display("not a directory: {}", path))]
    NotADirectory { path: String },
    #[snafu(display("{} is a directory", path))]
    IsADirectory { path: String },
    #[snafu(display("cannot touch '{}': is a directory", path))]
    CannotTouchDirectory { path: String },
    #[snafu(display("cannot touch '{}': invalid file name", path))]
    InvalidFileName { path: String },
    #[snafu(display("cannot access parent directory {}: {}", path, source))]
    ParentUnreachable {
        path: String,
        #[snafu(source(from(VfsError, Box::new)))]
        source: Box<VfsError>,
    },
    #[snafu(display("parent is not a directory: {}", path))]
    ParentNotDirectory { path: String },
}
