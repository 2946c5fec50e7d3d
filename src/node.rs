//! Typed handles into schema documents.

use std::fmt;
use std::rc::Rc;

use roxmltree::Node;

use crate::XS_NS;
use crate::qname::QName;
use crate::tree::is_xs;

/// Was für ein XSD-Knoten hinter einem [`SchemaNode`] steht.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaNodeKind {
    Element,
    ComplexType,
    SimpleType,
    Restriction,
    Extension,
    Facet,
    /// group, attribute, sequence, annotation, ...
    Other,
}

impl SchemaNodeKind {
    /// Klassifiziert einen Knoten anhand Namespace und local-name.
    pub fn of(node: Node<'_, '_>) -> Self {
        if !node.is_element() || node.tag_name().namespace() != Some(XS_NS) {
            return Self::Other;
        }
        match node.tag_name().name() {
            "element" => Self::Element,
            "complexType" => Self::ComplexType,
            "simpleType" => Self::SimpleType,
            "restriction" => Self::Restriction,
            "extension" => Self::Extension,
            name if crate::facet::FacetKind::from_local_name(name).is_some() => Self::Facet,
            _ => Self::Other,
        }
    }

    /// complexType oder simpleType.
    pub fn is_type(self) -> bool {
        matches!(self, Self::ComplexType | Self::SimpleType)
    }
}

/// A non-owning handle to a node of a registered schema document.
///
/// Trägt neben dem `roxmltree` Knoten den effektiven Target Namespace des
/// Dokuments, unter dem der Knoten gefunden wurde. Der Namespace kann vom
/// deklarierten abweichen, wenn das Dokument mit explizitem Namespace
/// registriert wurde.
#[derive(Clone)]
pub struct SchemaNode<'a> {
    kind: SchemaNodeKind,
    node: Node<'a, 'a>,
    target_ns: Rc<str>,
}

impl fmt::Debug for SchemaNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("kind", &self.kind)
            .field("name", &self.name())
            .field("target_ns", &self.target_ns)
            .finish()
    }
}

/// Gleich wenn es derselbe Knoten im selben Dokument ist.
impl PartialEq for SchemaNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for SchemaNode<'_> {}

impl<'a> SchemaNode<'a> {
    pub(crate) fn new(node: Node<'a, 'a>, target_ns: Rc<str>) -> Self {
        Self { kind: SchemaNodeKind::of(node), node, target_ns }
    }

    /// Knoten aus demselben Dokument wie `self`.
    pub(crate) fn sibling(&self, node: Node<'a, 'a>) -> Self {
        Self::new(node, self.target_ns.clone())
    }

    pub fn kind(&self) -> SchemaNodeKind {
        self.kind
    }

    /// Der zugrunde liegende `roxmltree` Knoten.
    pub fn node(&self) -> Node<'a, 'a> {
        self.node
    }

    /// Target Namespace des Dokuments.
    pub fn target_namespace(&self) -> &Rc<str> {
        &self.target_ns
    }

    /// Das `name` Attribut der Definition.
    pub fn name(&self) -> Option<&'a str> {
        self.node.attribute("name")
    }

    /// Qualifizierter Name der Definition.
    ///
    /// Globale Definitionen liegen im Target Namespace. Lokale Elemente
    /// folgen `form` bzw. `elementFormDefault` des Schemas. Elemente mit
    /// `ref` haben den aufgelösten Referenz-Namen.
    pub fn qname(&self) -> Option<QName> {
        if self.kind == SchemaNodeKind::Element
            && let Some(r) = self.node.attribute("ref")
        {
            return crate::tree::resolve_qname(r, self.node);
        }
        let name = self.name()?;
        Some(QName::new(self.definition_namespace(), name))
    }

    fn definition_namespace(&self) -> Rc<str> {
        if self.kind != SchemaNodeKind::Element || self.is_global() {
            return self.target_ns.clone();
        }
        let qualified = match self.node.attribute("form") {
            Some(form) => form == "qualified",
            None => self.node.document().root_element().attribute("elementFormDefault")
                == Some("qualified"),
        };
        if qualified { self.target_ns.clone() } else { Rc::from("") }
    }

    /// Direktes Kind von `xs:schema`.
    pub fn is_global(&self) -> bool {
        self.node.parent_element().is_some_and(|p| is_xs(p, "schema"))
    }

    /// Zeile/Spalte im Quelldokument.
    pub fn position(&self) -> roxmltree::TextPos {
        self.node.document().text_pos_at(self.node.range().start)
    }
}

impl fmt::Display for SchemaNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.position();
        match self.qname() {
            Some(q) => write!(f, "xs:{} {q} ({}:{})", self.node.tag_name().name(), pos.row, pos.col),
            None => write!(f, "anonymous xs:{} ({}:{})", self.node.tag_name().name(), pos.row, pos.col),
        }
    }
}
