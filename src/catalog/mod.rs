//! Schema catalog: namespace-indexed schema documents and type resolution.
//!
//! Der Katalog hält nur Referenzen auf [`SchemaTree`]s, die der Aufrufer
//! besitzt. Einzige Ausnahme ist das eingebettete Built-in-Schema
//! (`builtins.xsd`), das prozessweit einmal geparst und bei jeder
//! Konstruktion zuerst registriert wird.
//!
//! # Scope
//!
//! - Lookup globaler Elemente, Typen und Model Groups per QName
//! - Restriction-/Extension-Ketten mit Zyklus- und Tiefenschutz
//! - Facet-Sammlung mit Override-Regeln
//! - Abbildung von Instanz-Knoten auf Element-Definitionen (inkl. xsi:type)
//!
//! # Out of Scope
//!
//! - Validierung von Instanzwerten gegen Facets
//! - Substitution Groups, Wildcard-Auflösung
//!
//! # Beispiel
//!
//! ```
//! use xsd_catalog::{SchemaCatalog, SchemaTree};
//!
//! let tree = SchemaTree::parse(r#"
//!     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
//!                xmlns:tns="urn:shop" targetNamespace="urn:shop">
//!         <xs:simpleType name="Sku">
//!             <xs:restriction base="xs:token">
//!                 <xs:maxLength value="12"/>
//!             </xs:restriction>
//!         </xs:simpleType>
//!         <xs:element name="sku" type="tns:Sku"/>
//!     </xs:schema>
//! "#).unwrap();
//!
//! let catalog = SchemaCatalog::new([&tree]).unwrap();
//! let sku = catalog.find_element("urn:shop", "sku").unwrap();
//! let ty = catalog.find_element_type(&sku).unwrap();
//! assert_eq!(catalog.find_base_type_for(&ty).unwrap(), Some("string"));
//! ```

mod chain;
mod facets;
mod instance;

use std::sync::OnceLock;

use roxmltree::Node;

use crate::config::CatalogConfig;
use crate::error::{ChainKind, Error, Result};
use crate::node::{SchemaNode, SchemaNodeKind};
use crate::qname::QName;
use crate::store::NamespaceStore;
use crate::tree::{self, SchemaTree};
use crate::{FastHashSet, XS_NS};

/// Eingebettetes Built-in-Schema (XSD Part 2 Datentypen).
const BUILTINS_XSD: &str = include_str!("builtins.xsd");

static BUILTINS: OnceLock<SchemaTree<'static>> = OnceLock::new();

/// Das prozessweit geteilte Built-in-Schema.
pub fn builtins() -> &'static SchemaTree<'static> {
    BUILTINS.get_or_init(|| match SchemaTree::parse(BUILTINS_XSD) {
        Ok(tree) => tree,
        // Eingebettete Ressource; ein Fehler hier ist ein Build-Fehler.
        Err(e) => panic!("embedded builtins.xsd is invalid: {e}"),
    })
}

/// Namespace-indexed collection of schema documents plus all resolution
/// algorithms.
#[derive(Debug)]
pub struct SchemaCatalog<'a> {
    store: NamespaceStore<'a>,
    config: CatalogConfig,
}

impl<'a> SchemaCatalog<'a> {
    /// Erstellt einen Katalog mit Default-Konfiguration.
    ///
    /// Das Built-in-Schema wird zuerst registriert, danach jedes Dokument in
    /// Iterationsreihenfolge über [`add_item`](Self::add_item).
    pub fn new<I>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a SchemaTree<'a>>,
    {
        Self::with_config(documents, CatalogConfig::default())
    }

    /// Wie [`new`](Self::new), mit expliziter Konfiguration.
    pub fn with_config<I>(documents: I, config: CatalogConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a SchemaTree<'a>>,
    {
        let mut store = NamespaceStore::new();
        store.set(XS_NS, builtins());
        let mut catalog = Self { store, config };
        for doc in documents {
            catalog.add_item(doc, None)?;
        }
        Ok(catalog)
    }

    /// Registriert ein weiteres Dokument.
    ///
    /// `namespace` überschreibt den Target Namespace des Dokuments. Keine
    /// Deduplizierung: dasselbe Dokument zweimal zu registrieren verlängert
    /// nur die Suchreihenfolge.
    pub fn add_item(&mut self, document: &'a SchemaTree<'a>, namespace: Option<&str>) -> Result<()> {
        let Some(ns) = namespace.or(document.target_namespace()) else {
            return Err(Error::InvalidSchema(
                "schema document has no targetNamespace and none was supplied".to_string(),
            ));
        };
        self.store.set(ns, document);
        log::debug!("registered schema document under namespace '{ns}'");
        Ok(())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Registrierte Namespaces (Built-in-Namespace zuerst).
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.store.namespaces()
    }

    // ========================================================================
    // Lookup by name
    // ========================================================================

    /// Scannt die Dokumente eines Namespace in Registrierungsreihenfolge.
    fn scan<F>(&self, namespace: &str, mut find: F) -> Option<SchemaNode<'a>>
    where
        F: FnMut(&'a SchemaTree<'a>) -> Option<Node<'a, 'a>>,
    {
        let (ns, trees) = self.store.get(namespace)?;
        trees
            .iter()
            .copied()
            .find_map(&mut find)
            .map(|node| SchemaNode::new(node, ns.clone()))
    }

    /// Erstes globales Element `{namespace}name`.
    pub fn find_element(&self, namespace: &str, name: &str) -> Option<SchemaNode<'a>> {
        self.scan(namespace, |t| t.find_element(name))
    }

    /// Erste globale Typ-Definition `{namespace}name` (complex oder simple).
    pub fn find_type_by_name(&self, namespace: &str, name: &str) -> Option<SchemaNode<'a>> {
        self.scan(namespace, |t| t.find_type_by_name(name).into_iter().next())
    }

    /// Erste globale Model Group `{namespace}name`.
    pub fn find_group(&self, namespace: &str, name: &str) -> Option<SchemaNode<'a>> {
        self.scan(namespace, |t| t.find_group(name))
    }

    /// [`find_type_by_name`](Self::find_type_by_name) für einen QName.
    pub fn find_type(&self, qname: &QName) -> Option<SchemaNode<'a>> {
        let found = self.find_type_by_name(&qname.uri, &qname.local_name);
        if found.is_none() {
            log::trace!("type {qname} not found");
        }
        found
    }

    /// Löst eine Typ-Referenz aus einem Attribut von `node` auf.
    ///
    /// `node` kann aus einem Schema oder einem Instanzdokument stammen
    /// (`xsi:type` mit `attr_ns = Some(XSI_NS)`).
    pub fn find_type_definition_from_node_attr(
        &self,
        node: Node<'_, '_>,
        attr: &str,
        attr_ns: Option<&str>,
    ) -> Option<SchemaNode<'a>> {
        let qname = tree::get_type_from_node_attr(node, attr, attr_ns)?;
        self.find_type(&qname)
    }

    /// Typ-Definition eines Elements.
    ///
    /// Reihenfolge: `ref` auf die globale Deklaration umlenken, dann
    /// eingebetteter anonymer Typ, dann `type` Attribut. Ohne beides gilt
    /// `xs:anyType`.
    pub fn find_element_type(&self, element: &SchemaNode<'a>) -> Option<SchemaNode<'a>> {
        if element.kind() != SchemaNodeKind::Element {
            return None;
        }
        let declaration = match element.node().attribute("ref") {
            Some(_) => {
                let target = element.qname()?;
                self.find_element(&target.uri, &target.local_name)?
            }
            None => element.clone(),
        };

        if let Some(embedded) = tree::get_embedded_type(declaration.node()) {
            return Some(declaration.sibling(embedded));
        }
        match tree::get_type_from_node_attr(declaration.node(), "type", None) {
            Some(qname) => self.find_type(&qname),
            None if declaration.node().has_attribute("type") => None,
            None => self.find_type_by_name(XS_NS, "anyType"),
        }
    }
}

/// Zyklus- und Tiefenschutz für einen Kettenlauf.
///
/// Besuchte Definitionen werden über ihren QName erkannt; anonyme Typen sind
/// nicht referenzierbar und können keinen Zyklus schließen.
pub(crate) struct ChainGuard {
    kind: ChainKind,
    visited: FastHashSet<QName>,
    steps: usize,
    max_depth: usize,
}

impl ChainGuard {
    pub(crate) fn new(kind: ChainKind, config: &CatalogConfig) -> Self {
        Self {
            kind,
            visited: FastHashSet::default(),
            steps: 0,
            max_depth: config.max_chain_depth(),
        }
    }

    /// Registriert den nächsten Schritt der Kette.
    pub(crate) fn visit(&mut self, node: &SchemaNode<'_>) -> Result<()> {
        let label = node
            .qname()
            .map(|q| q.to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        if self.steps >= self.max_depth {
            log::warn!("{} chain exceeds {} steps at {label}", self.kind, self.max_depth);
            return Err(Error::malformed_chain(self.kind, label, self.steps));
        }
        if let Some(qname) = node.qname()
            && !self.visited.insert(qname)
        {
            log::warn!("cyclic {} chain at {label}", self.kind);
            return Err(Error::malformed_chain(self.kind, label, self.steps));
        }
        self.steps += 1;
        Ok(())
    }
}
