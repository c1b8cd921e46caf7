//! Serialized VFS sources.
//!
//! Two shapes are accepted: a flat `path,type,content` table (CSV) and a
//! nested document (JSON or YAML) that mirrors the tree directly. Both produce
//! the same [`Tree`].

use std::borrow::Cow;
use std::path::Path;

use clap::ValueEnum;
use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use super::node::{Node, NodeId};
use super::path;
use super::tree::{EntryType, Record, Tree, TreeBuildError};

const HEADER_PATH: &str = "path";
const HEADER_TYPE: &str = "type";
const HEADER_CONTENT: &str = "content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceFormat {
    /// Pick by file extension, then by content
    #[default]
    Auto,
    /// `path,type,content` records
    Table,
    /// Nested `name`/`is_dir`/`content`/`children` document
    Document,
}

impl SourceFormat {
    fn detect(file_path: &Path, contents: &str) -> Self {
        let by_extension = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match by_extension.as_deref() {
            Some("csv") => SourceFormat::Table,
            Some("json" | "yaml" | "yml") => SourceFormat::Document,
            _ if contents.trim_start().starts_with('{') => SourceFormat::Document,
            _ => SourceFormat::Table,
        }
    }
}

/// Reads and parses a source file.
pub async fn load(file_path: &Path, format: SourceFormat) -> Result<Tree, SourceError> {
    debug!("Reading VFS source: {}", file_path.display());
    let bytes = fs::read(file_path).await.context(ReadSnafu {
        file_path: file_path.display().to_string(),
    })?;
    let contents = String::from_utf8_lossy(&bytes);

    let format = match format {
        SourceFormat::Auto => SourceFormat::detect(file_path, &contents),
        explicit => explicit,
    };
    debug!("Parsing VFS source as {:?}", format);

    let tree = parse(&contents, format)?;
    info!(
        "Loaded VFS from {} ({} nodes)",
        file_path.display(),
        tree.node_count()
    );
    Ok(tree)
}

pub fn parse(contents: &str, format: SourceFormat) -> Result<Tree, SourceError> {
    match format {
        SourceFormat::Document => parse_document(contents),
        SourceFormat::Table | SourceFormat::Auto => {
            Tree::from_records(parse_table(contents)?).context(StructureSnafu)
        }
    }
}

/// Parses the tabular form into records. Structural checks happen later in
/// [`Tree::from_records`].
pub fn parse_table(contents: &str) -> Result<Vec<Record>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let mut rows = reader.records();

    let header = rows.next().context(EmptySnafu)?.context(CsvSnafu)?;
    let header_ok = header.get(0).map(str::trim) == Some(HEADER_PATH)
        && header.get(1).map(str::trim) == Some(HEADER_TYPE)
        && header
            .get(2)
            .is_none_or(|column| column.trim() == HEADER_CONTENT)
        && header.len() <= 3;
    ensure!(header_ok, InvalidHeaderSnafu);

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let row = row.context(CsvSnafu)?;
        let line = row
            .position()
            .and_then(|position| usize::try_from(position.line()).ok())
            .unwrap_or(index + 2);

        let (Some(raw_path), Some(raw_type)) = (row.get(0), row.get(1)) else {
            return MissingFieldSnafu { line }.fail();
        };
        let record_path = raw_path.trim();
        let type_tag = raw_type.trim();
        if record_path.is_empty() {
            debug!("Skipping record with empty path at line {}", line);
            continue;
        }

        ensure!(
            path::is_absolute(record_path),
            NotAbsoluteSnafu {
                path: record_path,
                line
            }
        );
        let entry_type =
            EntryType::from_tag(type_tag).context(UnknownTypeSnafu { type_tag, line })?;

        records.push(Record::new(
            record_path,
            entry_type,
            row.get(2).unwrap_or_default(),
        ));
    }

    debug!("Parsed {} records", records.len());
    Ok(records)
}

type Mapping<'input> = LinkedHashMap<Yaml<'input>, Yaml<'input>>;

/// Parses the nested document form. Every node is validated while the tree is
/// built, so a malformed child fails the whole load.
pub fn parse_document(contents: &str) -> Result<Tree, SourceError> {
    let documents = Yaml::load_from_str(contents).context(DocumentSyntaxSnafu)?;
    let top = documents.first().context(EmptySnafu)?;
    let top = top.as_mapping().context(MalformedDocumentSnafu {
        path: path::ROOT,
        reason: "top level must be an object",
    })?;

    ensure!(
        bool_field(top, "is_dir", path::ROOT)?,
        MalformedDocumentSnafu {
            path: path::ROOT,
            reason: "root must be a directory",
        }
    );

    let mut tree = Tree::new();
    let root = tree.root();
    attach_children(&mut tree, root, path::ROOT, top)?;
    debug!("Document produced {} nodes", tree.node_count());
    Ok(tree)
}

fn attach_children(
    tree: &mut Tree,
    parent: NodeId,
    parent_path: &str,
    node: &Mapping<'_>,
) -> Result<(), SourceError> {
    ensure!(
        string_field(node, "content", parent_path)?.is_none(),
        MalformedDocumentSnafu {
            path: parent_path,
            reason: "directories cannot have content",
        }
    );

    let Some(children) = field(node, "children") else {
        return Ok(());
    };
    if matches!(children, Yaml::Value(Scalar::Null)) {
        return Ok(());
    }
    let children = children.as_mapping().context(MalformedDocumentSnafu {
        path: parent_path,
        reason: "children must be an object",
    })?;

    for (key, child) in children {
        let Yaml::Value(Scalar::String(name)) = key else {
            return MalformedDocumentSnafu {
                path: parent_path,
                reason: "child names must be strings",
            }
            .fail();
        };
        let name: &str = name;
        let child_path = path::join(parent_path, name);
        ensure!(
            is_valid_name(name),
            MalformedDocumentSnafu {
                path: child_path.as_str(),
                reason: "invalid node name",
            }
        );

        let child = child.as_mapping().context(MalformedDocumentSnafu {
            path: child_path.as_str(),
            reason: "node must be an object",
        })?;
        if let Some(declared) = string_field(child, "name", &child_path)? {
            ensure!(
                declared == name,
                MalformedDocumentSnafu {
                    path: child_path.as_str(),
                    reason: "name does not match its key",
                }
            );
        }

        if bool_field(child, "is_dir", &child_path)? {
            let id = tree
                .attach(parent, Node::directory(name))
                .context(MalformedDocumentSnafu {
                    path: child_path.as_str(),
                    reason: "parent is not a directory",
                })?;
            attach_children(tree, id, &child_path, child)?;
        } else {
            ensure!(
                field(child, "children").is_none_or(|c| matches!(c, Yaml::Value(Scalar::Null))),
                MalformedDocumentSnafu {
                    path: child_path.as_str(),
                    reason: "files cannot have children",
                }
            );
            let content = string_field(child, "content", &child_path)?.unwrap_or_default();
            tree.attach(parent, Node::file(name, content))
                .context(MalformedDocumentSnafu {
                    path: child_path.as_str(),
                    reason: "parent is not a directory",
                })?;
        }
    }

    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(path::SEPARATOR)
}

fn field<'a, 'input>(map: &'a Mapping<'input>, key: &'static str) -> Option<&'a Yaml<'input>> {
    map.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
}

fn bool_field(map: &Mapping<'_>, key: &'static str, node_path: &str) -> Result<bool, SourceError> {
    match field(map, key) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(false),
        Some(Yaml::Value(Scalar::Boolean(value))) => Ok(*value),
        Some(_) => MalformedDocumentSnafu {
            path: node_path,
            reason: format!("'{key}' must be a boolean"),
        }
        .fail(),
    }
}

fn string_field<'a>(
    map: &'a Mapping<'_>,
    key: &'static str,
    node_path: &str,
) -> Result<Option<&'a str>, SourceError> {
    match field(map, key) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
        Some(Yaml::Value(Scalar::String(value))) => Ok(Some(&**value)),
        Some(_) => MalformedDocumentSnafu {
            path: node_path,
            reason: format!("'{key}' must be a string"),
        }
        .fail(),
    }
}

#[derive(Debug, Snafu)]
pub enum SourceError {
    #[snafu(display("Failed to read VFS source: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("empty VFS source"))]
    EmptyError,
    #[snafu(display("invalid CSV"))]
    CsvError { source: csv::Error },
    #[snafu(display("invalid CSV header (expected: path,type,content)"))]
    InvalidHeaderError,
    #[snafu(display("record at line {} has less than 2 fields", line))]
    MissingFieldError { line: usize },
    #[snafu(display("absolute path required, got '{}' (line {})", path, line))]
    NotAbsoluteError { path: String, line: usize },
    #[snafu(display("unknown type '{}' at line {}", type_tag, line))]
    UnknownTypeError { type_tag: String, line: usize },
    #[snafu(display("invalid VFS document"))]
    DocumentSyntaxError { source: saphyr::ScanError },
    #[snafu(display("malformed VFS document at {}: {}", path, reason))]
    MalformedDocumentError { path: String, reason: String },
    #[snafu(display("invalid VFS structure"))]
    StructureError { source: TreeBuildError },
}
