//! Schema-Quellen laden (Dateien inkl. import/include/redefine).
//!
//! [`SchemaTree`] leiht sich seinen Text nur aus. [`SchemaSources`] besitzt
//! deshalb alle Texte, [`SchemaSources::parse`] liefert die Bäume, und der
//! [`SchemaCatalog`](crate::SchemaCatalog) leiht sich wiederum diese.
//!
//! # Beispiel
//!
//! ```
//! use xsd_catalog::{SchemaCatalog, SchemaSources};
//!
//! let mut sources = SchemaSources::new();
//! sources.push_str(
//!     r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!            <xs:element name="note" type="xs:string"/>
//!        </xs:schema>"#,
//!     Some("urn:notes"),
//! );
//! let trees = sources.parse().unwrap();
//! let catalog = SchemaCatalog::new(&trees).unwrap();
//! assert!(catalog.find_element("urn:notes", "note").is_some());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node, ParsingOptions};

use crate::FastHashSet;
use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::tree::{SchemaTree, is_xs, xs_children};
use crate::{XML_NS, XS_NS};

/// Ein geladener Schema-Text.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    path: Option<PathBuf>,
    text: String,
    namespace_hint: Option<String>,
}

impl SchemaSource {
    /// Kanonischer Pfad, `None` für In-Memory-Quellen.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Namespace für Schemas ohne eigenen `targetNamespace`.
    pub fn namespace_hint(&self) -> Option<&str> {
        self.namespace_hint.as_deref()
    }
}

/// Owned schema texts, collected from files or memory.
#[derive(Debug, Default)]
pub struct SchemaSources {
    sources: Vec<SchemaSource>,
    /// Bereits gelesene Dateien (kanonisch) – Schutz gegen zirkuläre Imports.
    loaded: FastHashSet<PathBuf>,
    config: CatalogConfig,
}

/// `xs:import`, `xs:include` oder `xs:redefine` mit `schemaLocation`.
#[derive(Debug)]
struct SchemaReference {
    location: String,
    /// `true` für include/redefine: Chameleon-Namespace wird vererbt.
    inherits_namespace: bool,
}

impl SchemaSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leere Sammlung mit eigener Konfiguration (Größenlimit).
    pub fn with_config(config: CatalogConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Lädt eine Schema-Datei samt aller referenzierten Schemas.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut sources = Self::new();
        sources.add_file(path)?;
        Ok(sources)
    }

    /// Fügt eine Schema-Datei samt aller referenzierten Schemas hinzu.
    ///
    /// Bereits geladene Dateien werden übersprungen, auch wenn sie über
    /// einen anderen relativen Pfad erreicht werden.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.collect_recursive(path.as_ref(), None)
    }

    /// Fügt einen In-Memory-Schema-Text hinzu.
    pub fn push_str(&mut self, text: impl Into<String>, namespace_hint: Option<&str>) {
        self.sources.push(SchemaSource {
            path: None,
            text: text.into(),
            namespace_hint: namespace_hint.map(str::to_string),
        });
    }

    /// Parsed alle Quellen in Ladereihenfolge.
    pub fn parse(&self) -> Result<Vec<SchemaTree<'_>>> {
        self.sources
            .iter()
            .map(|source| {
                SchemaTree::parse_with_options(
                    &source.text,
                    source.namespace_hint.as_deref(),
                    self.config.max_schema_size(),
                )
                .map_err(|e| match (e, &source.path) {
                    (Error::XsdParse(msg), Some(path)) => {
                        Error::XsdParse(format!("{}: {msg}", path.display()))
                    }
                    (e, _) => e,
                })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn collect_recursive(&mut self, path: &Path, namespace_hint: Option<&str>) -> Result<()> {
        let canonical = path
            .canonicalize()
            .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
        if !self.loaded.insert(canonical.clone()) {
            log::trace!("already loaded: {}", canonical.display());
            return Ok(());
        }

        let content = fs::read_to_string(&canonical)
            .map_err(|e| Error::Io(format!("{}: {e}", canonical.display())))?;

        // DoS-Schutz durch Eingabegrößenbeschränkung
        if content.len() > self.config.max_schema_size() {
            return Err(Error::XsdParse(format!(
                "{}: XSD document too large: {} bytes (max {} bytes)",
                canonical.display(),
                content.len(),
                self.config.max_schema_size()
            )));
        }

        // Referenzen und effektiven Namespace bestimmen, bevor content verschoben wird
        let (target_ns, references) = {
            let xml_opts = ParsingOptions { allow_dtd: true, ..Default::default() };
            let doc = Document::parse_with_options(&content, xml_opts)
                .map_err(|e| Error::XsdParse(format!("{}: XML: {e}", canonical.display())))?;
            let root = doc.root_element();
            if !is_xs(root, "schema") {
                return Err(Error::XsdParse(format!(
                    "{}: Root element must be xs:schema",
                    canonical.display()
                )));
            }
            let target_ns = root
                .attribute("targetNamespace")
                .or(namespace_hint)
                .map(str::to_string);
            (target_ns, collect_references(root))
        };

        log::debug!(
            "loaded schema {} (namespace {:?}, {} references)",
            canonical.display(),
            target_ns,
            references.len()
        );

        let schema_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        self.sources.push(SchemaSource {
            path: Some(canonical),
            text: content,
            namespace_hint: namespace_hint.map(str::to_string),
        });

        for reference in references {
            let location = schema_dir.join(&reference.location);
            if !location.exists() {
                return Err(Error::XsdParse(format!(
                    "Referenced schema not found: '{}'",
                    reference.location
                )));
            }
            let hint = if reference.inherits_namespace { target_ns.as_deref() } else { None };
            self.collect_recursive(&location, hint)?;
        }

        Ok(())
    }
}

impl FromStr for SchemaSources {
    type Err = Error;

    /// Eine einzelne In-Memory-Quelle ohne Namespace-Hint.
    fn from_str(text: &str) -> Result<Self> {
        let mut sources = Self::new();
        sources.push_str(text, None);
        Ok(sources)
    }
}

fn collect_references(root: Node<'_, '_>) -> Vec<SchemaReference> {
    xs_children(root)
        .filter_map(|node| {
            let inherits_namespace = match node.tag_name().name() {
                "import" => {
                    // Built-in Namespaces sind eingebettet
                    if matches!(node.attribute("namespace"), Some(XML_NS | XS_NS)) {
                        return None;
                    }
                    false
                }
                "include" | "redefine" => true,
                _ => return None,
            };
            // schemaLocation ist bei import optional; ohne Ort gibt es nichts zu laden
            let location = node.attribute("schemaLocation")?;
            Some(SchemaReference { location: location.to_string(), inherits_namespace })
        })
        .collect()
}
