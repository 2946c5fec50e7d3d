//! xsd-catalog – XML Schema type resolution
//!
//! Registriert geparste XSD-Dokumente nach Target Namespace und beantwortet
//! die Frage "welche Element-/Typ-Definition gilt für diesen Namen bzw.
//! diesen Instanz-Knoten": Restriction-/Extension-Ketten, Facet-Sammlung,
//! Abbildung von Instanz-Elementen (inkl. `xsi:type`) auf Definitionen.
//!
//! # Beispiel
//!
//! ```
//! use xsd_catalog::{QName, SchemaCatalog, SchemaTree};
//!
//! let tree = SchemaTree::parse(r#"
//!     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
//!                targetNamespace="urn:greet" elementFormDefault="qualified">
//!         <xs:element name="greeting">
//!             <xs:complexType>
//!                 <xs:sequence>
//!                     <xs:element name="text" type="xs:string"/>
//!                 </xs:sequence>
//!             </xs:complexType>
//!         </xs:element>
//!     </xs:schema>
//! "#).unwrap();
//! let catalog = SchemaCatalog::new([&tree]).unwrap();
//!
//! let xml = roxmltree::Document::parse(
//!     r#"<greeting xmlns="urn:greet"><text>Hello</text></greeting>"#,
//! ).unwrap();
//! let text = xml.descendants().find(|n| n.has_tag_name("text")).unwrap();
//!
//! let decl = catalog.find_element_for_xml_node(text).unwrap().unwrap();
//! assert_eq!(decl.qname().unwrap(), QName::new("urn:greet", "text"));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod facet;
pub mod loader;
pub mod node;
pub mod qname;
pub mod store;
pub mod tree;

pub use error::{ChainKind, Error, Result};

/// XML Schema Namespace.
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema Instance Namespace (`xsi:type`, `xsi:nil`).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML Namespace (Prefix `xml`, implizit immer gebunden).
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// HashSet mit ahash (schneller, nicht DoS-resistent; nur für interne Datenstrukturen).
pub(crate) type FastHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API
pub use catalog::SchemaCatalog;
pub use config::CatalogConfig;
pub use facet::{Facet, FacetGroup, FacetKind};
pub use loader::{SchemaSource, SchemaSources};
pub use node::{SchemaNode, SchemaNodeKind};
pub use qname::QName;
pub use store::NamespaceStore;
pub use tree::SchemaTree;
