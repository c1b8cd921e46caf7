use derive_more::Display;
use snafu::prelude::*;
use tracing::{debug, trace};

use super::node::{Node, NodeId};
use super::path::{self, ROOT};

/// Type tag of a tabular record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryType {
    #[display("dir")]
    Dir,
    #[display("file")]
    File,
}

impl EntryType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dir" => Some(EntryType::Dir),
            "file" => Some(EntryType::File),
            _ => None,
        }
    }
}

/// One row of the tabular source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub path: String,
    pub entry_type: EntryType,
    pub content: String,
}

impl Record {
    pub fn new(path: impl Into<String>, entry_type: EntryType, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entry_type,
            content: content.into(),
        }
    }
}

/// Arena-backed node tree. Node `0` is always the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::directory(ROOT)],
            root: NodeId::from(0),
        }
    }

    /// Builds a tree from tabular records in any order.
    ///
    /// Records are normalized and then inserted shallowest first, so a parent
    /// row always lands before its children. Missing intermediate directories
    /// are created on the way down.
    pub fn from_records(
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, TreeBuildError> {
        let mut records = records
            .into_iter()
            .map(|record| -> Result<Record, TreeBuildError> {
                ensure!(
                    path::is_absolute(&record.path),
                    NotAbsoluteSnafu { path: record.path }
                );
                Ok(Record {
                    path: path::clean(&record.path),
                    ..record
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Stable, so siblings keep their source order. The root is the only
        // depth-zero path and therefore always comes first.
        records.sort_by_key(|record| path::depth(&record.path));
        debug!("Building tree from {} records", records.len());

        let mut tree = Self::new();
        let mut root_declared = false;
        for record in &records {
            if record.path == ROOT {
                ensure!(record.entry_type == EntryType::Dir, RootNotDirectorySnafu);
                ensure!(!root_declared, DuplicatePathSnafu { path: ROOT });
                root_declared = true;
                continue;
            }
            tree.insert_record(record)?;
        }

        debug!("Tree built with {} nodes", tree.node_count());
        Ok(tree)
    }

    fn insert_record(&mut self, record: &Record) -> Result<(), TreeBuildError> {
        let segments: Vec<&str> = record
            .path
            .split(path::SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();
        let mut current = self.root;

        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();

            match self.child(current, segment) {
                Some(_) if is_last => {
                    return DuplicatePathSnafu {
                        path: record.path.clone(),
                    }
                    .fail();
                }
                Some(existing) => {
                    ensure!(
                        self.node(existing).is_directory(),
                        NonDirectoryAncestorSnafu {
                            path: record.path.clone(),
                        }
                    );
                    current = existing;
                }
                None => {
                    let node = match (is_last, record.entry_type) {
                        (true, EntryType::File) => Node::file(*segment, record.content.as_str()),
                        _ => Node::directory(*segment),
                    };
                    trace!("Materializing {} under {}", segment, current);
                    current = self.attach(current, node).context(NonDirectoryAncestorSnafu {
                        path: record.path.clone(),
                    })?;
                }
            }
        }

        Ok(())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[usize::from(id)]
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .children()
            .and_then(|children| children.get(name).copied())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds `node` as a child of `parent`. Returns `None` when `parent` is a
    /// file. An existing child with the same name is replaced in the mapping.
    pub fn attach(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        let id = NodeId::from(self.nodes.len());
        let name = node.name().to_string();
        let children = self.nodes[usize::from(parent)].children_mut()?;
        children.insert(name, id);
        self.nodes.push(node);
        Some(id)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
pub enum TreeBuildError {
    #[snafu(display("absolute path required, got '{}'", path))]
    NotAbsolute { path: String },
    #[snafu(display("duplicate path: {}", path))]
    DuplicatePath { path: String },
    #[snafu(display("non-directory ancestor in path: {}", path))]
    NonDirectoryAncestor { path: String },
    #[snafu(display("root must be a directory"))]
    RootNotDirectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new("/", EntryType::Dir, ""),
            Record::new("/home", EntryType::Dir, ""),
            Record::new("/home/a.txt", EntryType::File, "aGVsbG8="),
        ]
    }

    fn lookup(tree: &Tree, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(tree.root(), |current, segment| tree.child(current, segment))
    }

    #[test]
    fn test_builds_sample_tree() {
        let tree = Tree::from_records(sample_records()).unwrap();
        assert_eq!(tree.node_count(), 3);

        let file = lookup(&tree, "/home/a.txt").expect("file should exist");
        assert_eq!(tree.node(file).content(), Some("aGVsbG8="));
        assert!(tree.node(lookup(&tree, "/home").unwrap()).is_directory());
    }

    #[test]
    fn test_declared_types_round_trip() {
        let records = vec![
            Record::new("/etc", EntryType::Dir, ""),
            Record::new("/etc/hosts", EntryType::File, "127.0.0.1"),
            Record::new("/var/log", EntryType::Dir, ""),
            Record::new("/var/log/syslog", EntryType::File, ""),
        ];
        let tree = Tree::from_records(records.clone()).unwrap();

        for record in records {
            let id = lookup(&tree, &record.path).expect("declared path should resolve");
            assert_eq!(
                tree.node(id).is_directory(),
                record.entry_type == EntryType::Dir,
                "type mismatch for {}",
                record.path
            );
        }
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let mut reversed = sample_records();
        reversed.reverse();
        let rotated = {
            let mut rows = sample_records();
            rows.rotate_left(1);
            rows
        };

        let expected = Tree::from_records(sample_records()).unwrap();
        for rows in [reversed, rotated] {
            let tree = Tree::from_records(rows).unwrap();
            for path in ["/home", "/home/a.txt"] {
                let left = expected.node(lookup(&expected, path).unwrap());
                let right = tree.node(lookup(&tree, path).unwrap());
                assert_eq!(left.is_directory(), right.is_directory());
                assert_eq!(left.content(), right.content());
            }
        }
    }

    #[test]
    fn test_creates_missing_intermediate_directories() {
        let tree =
            Tree::from_records(vec![Record::new("/a/b/c.txt", EntryType::File, "x")]).unwrap();
        assert!(tree.node(lookup(&tree, "/a").unwrap()).is_directory());
        assert!(tree.node(lookup(&tree, "/a/b").unwrap()).is_directory());
        assert!(!tree.node(lookup(&tree, "/a/b/c.txt").unwrap()).is_directory());
    }

    #[test]
    fn test_paths_are_normalized() {
        let tree = Tree::from_records(vec![
            Record::new("//home/./user/", EntryType::Dir, ""),
            Record::new("/home/user/../other", EntryType::Dir, ""),
        ])
        .unwrap();
        assert!(lookup(&tree, "/home/user").is_some());
        assert!(lookup(&tree, "/home/other").is_some());
    }

    #[test]
    fn test_rejects_relative_path() {
        let result = Tree::from_records(vec![Record::new("home", EntryType::Dir, "")]);
        assert!(matches!(result, Err(TreeBuildError::NotAbsolute { .. })));
    }

    #[test]
    fn test_rejects_duplicate_path() {
        let result = Tree::from_records(vec![
            Record::new("/home", EntryType::Dir, ""),
            Record::new("/home/", EntryType::Dir, ""),
        ]);
        match result {
            Err(TreeBuildError::DuplicatePath { path }) => assert_eq!(path, "/home"),
            other => panic!("Expected DuplicatePath, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_root() {
        let result = Tree::from_records(vec![
            Record::new("/", EntryType::Dir, ""),
            Record::new("/", EntryType::Dir, ""),
        ]);
        assert!(matches!(result, Err(TreeBuildError::DuplicatePath { .. })));
    }

    #[test]
    fn test_rejects_file_ancestor() {
        let result = Tree::from_records(vec![
            Record::new("/a.txt", EntryType::File, ""),
            Record::new("/a.txt/b", EntryType::File, ""),
        ]);
        assert!(matches!(
            result,
            Err(TreeBuildError::NonDirectoryAncestor { .. })
        ));
    }

    #[test]
    fn test_rejects_file_root() {
        let result = Tree::from_records(vec![Record::new("/", EntryType::File, "")]);
        assert!(matches!(result, Err(TreeBuildError::RootNotDirectory)));
    }

    #[test]
    fn test_siblings_keep_source_order() {
        let tree = Tree::from_records(vec![
            Record::new("/zeta", EntryType::Dir, ""),
            Record::new("/alpha", EntryType::File, ""),
            Record::new("/mid", EntryType::File, ""),
        ])
        .unwrap();
        let names: Vec<&String> = tree
            .node(tree.root())
            .children()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_attach_to_file_is_rejected() {
        let mut tree = Tree::new();
        let file = tree.attach(tree.root(), Node::file("f", "")).unwrap();
        assert!(tree.attach(file, Node::file("g", "")).is_none());
    }

    #[test]
    fn test_error_display_names_path() {
        let error = TreeBuildError::NonDirectoryAncestor {
            path: "/a.txt/b".to_string(),
        };
        assert!(error.to_string().contains("/a.txt/b"));
    }
}
