//! Document loading and conversion entry points
//!
//! [Converter] runs the full tokenize -> parse pipeline with one configuration. [DocumentLoader]
//! holds markdown source read from a file or a string, and [convert_file] is the `.md` -> `.ai`
//! file conversion used by the CLI.
//!
//! ```rust,ignore
//! use md2aditor::{Converter, DocumentLoader};
//!
//! let converter = Converter::default();
//! let doc = DocumentLoader::from_path("notes.md")?.convert(&converter);
//! ```

use crate::aditor::assets::AssetResolver;
use crate::aditor::ast::{to_json_string, Document};
use crate::aditor::config::ConverterConfig;
use crate::aditor::lexing::tokenize;
use crate::aditor::parsing::Parser;
use crate::aditor::token::Token;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const AI_EXTENSION: &str = "ai";

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Markdown to document conversion with fixed settings.
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    resolver: AssetResolver,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        let resolver = config.asset_resolver();
        Self { config, resolver }
    }

    /// Replace the asset resolver built from the configuration.
    pub fn with_resolver(mut self, resolver: AssetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn convert(&self, markdown: &str) -> Document {
        let tokens = tokenize(markdown);
        let children = Parser::new(&self.resolver).parse(&tokens);
        Document::new(
            &self.config.output.aditor_version,
            &self.config.output.egbenz_version,
            children,
        )
    }

    /// The document as the editor's JSON text.
    pub fn to_json(&self, doc: &Document) -> Result<String, LoaderError> {
        Ok(to_json_string(doc, self.config.output.indent)?)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

/// Convert markdown text into a document tree.
pub fn markdown_to_tree(
    markdown: &str,
    base_path: &str,
    intercept: &str,
    aditor_version: &str,
    egbenz_version: &str,
) -> Document {
    let mut config = ConverterConfig::default();
    config.assets.base_path = base_path.to_string();
    config.assets.intercept = intercept.to_string();
    config.output.aditor_version = aditor_version.to_string();
    config.output.egbenz_version = egbenz_version.to_string();
    Converter::new(config).convert(markdown)
}

/// Markdown source with conversion shortcuts.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    source: String,
    path: Option<PathBuf>,
}

impl DocumentLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LoaderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded markdown");
        Ok(Self {
            source,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_string<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            path: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path the source was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tokenize(&self) -> Vec<Token> {
        tokenize(&self.source)
    }

    pub fn convert(&self, converter: &Converter) -> Document {
        converter.convert(&self.source)
    }
}

/// Sibling `.ai` path of a markdown file.
pub fn ai_path_for(path: &Path) -> PathBuf {
    path.with_extension(AI_EXTENSION)
}

/// Convert a markdown file and write the tree next to it as `.ai` JSON.
pub fn convert_file(path: impl AsRef<Path>, converter: &Converter) -> Result<Document, LoaderError> {
    let path = path.as_ref();
    let doc = DocumentLoader::from_path(path)?.convert(converter);
    let json = converter.to_json(&doc)?;

    let target = ai_path_for(path);
    fs::write(&target, json).map_err(|source| LoaderError::Write {
        path: target.clone(),
        source,
    })?;
    tracing::debug!(path = %target.display(), blocks = doc.children.len(), "wrote document");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Converter {
        Converter::default().with_resolver(AssetResolver::offline("/", "static"))
    }

    #[test]
    fn test_empty_markdown_gives_empty_root() {
        let doc = offline().convert("");
        assert!(doc.is_empty());
        assert_eq!(doc.version, "0.0.15");
        assert_eq!(doc.egbenz_version, "0.0.7");
    }

    #[test]
    fn test_markdown_to_tree_uses_versions() {
        let doc = markdown_to_tree("# a", "/", "static", "1.0", "2.0");
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.egbenz_version, "2.0");
        assert_eq!(doc.children.len(), 1);
    }

    #[test]
    fn test_ai_path() {
        assert_eq!(ai_path_for(Path::new("notes/day.md")), PathBuf::from("notes/day.ai"));
        assert_eq!(ai_path_for(Path::new("README")), PathBuf::from("README.ai"));
    }

    #[test]
    fn test_convert_file_writes_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("note.md");
        fs::write(&source, "Hello **world**").unwrap();

        let doc = convert_file(&source, &offline()).unwrap();
        assert_eq!(doc.children.len(), 1);

        let written = fs::read_to_string(dir.path().join("note.ai")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["name"], "aditor");
        assert_eq!(value["children"][0]["children"][1]["text"], "world");
        assert!(written.contains("\n    \"name\""));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_file(dir.path().join("absent.md"), &offline()).unwrap_err();
        assert!(matches!(err, LoaderError::Read { .. }));
    }

    #[test]
    fn test_loader_from_string() {
        let loader = DocumentLoader::from_string("a\nb");
        assert!(loader.path().is_none());
        assert_eq!(loader.tokenize().len(), 3);
        assert_eq!(loader.convert(&offline()).children.len(), 2);
    }
}
