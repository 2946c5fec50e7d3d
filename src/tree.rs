//! Parsed schema documents and node-level XSD queries.
//!
//! [`SchemaTree`] besitzt ein `roxmltree::Document`, das den Schema-Text
//! ausleiht. Alle Abfragen hier arbeiten auf einem einzelnen Dokument; die
//! dokumentübergreifende Auflösung (Namespaces, Ketten) macht der
//! [`SchemaCatalog`](crate::SchemaCatalog).

use std::fmt;

use roxmltree::{Document, Node, ParsingOptions, TextPos};

use crate::config::DEFAULT_MAX_SCHEMA_SIZE;
use crate::error::{Error, Result};
use crate::facet::Facet;
use crate::qname::QName;
use crate::{XML_NS, XS_NS};

/// One parsed XSD document.
pub struct SchemaTree<'input> {
    doc: Document<'input>,
    /// Deklarierter targetNamespace, sonst der beim Parsen übergebene Hint.
    target_namespace: Option<String>,
}

impl fmt::Debug for SchemaTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTree")
            .field("target_namespace", &self.target_namespace)
            .finish_non_exhaustive()
    }
}

impl<'input> SchemaTree<'input> {
    /// Parsed ein XSD-Dokument.
    ///
    /// # Beispiel
    ///
    /// ```
    /// use xsd_catalog::SchemaTree;
    ///
    /// let tree = SchemaTree::parse(r#"
    ///     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    ///                targetNamespace="http://example.org">
    ///         <xs:element name="book" type="xs:string"/>
    ///     </xs:schema>
    /// "#).unwrap();
    ///
    /// assert_eq!(tree.target_namespace(), Some("http://example.org"));
    /// assert!(tree.find_element("book").is_some());
    /// ```
    pub fn parse(text: &'input str) -> Result<Self> {
        Self::parse_with_options(text, None, DEFAULT_MAX_SCHEMA_SIZE)
    }

    /// Wie [`parse`](Self::parse), aber mit Namespace-Hint für Schemas ohne
    /// `targetNamespace` (Chameleon-Includes).
    pub fn parse_with_namespace(text: &'input str, namespace_hint: Option<&str>) -> Result<Self> {
        Self::parse_with_options(text, namespace_hint, DEFAULT_MAX_SCHEMA_SIZE)
    }

    pub(crate) fn parse_with_options(
        text: &'input str,
        namespace_hint: Option<&str>,
        max_size: usize,
    ) -> Result<Self> {
        // DoS-Schutz durch Eingabegrößenbeschränkung
        if text.len() > max_size {
            return Err(Error::XsdParse(format!(
                "XSD document too large: {} bytes (max {} bytes)",
                text.len(),
                max_size
            )));
        }

        let xml_opts = ParsingOptions { allow_dtd: true, ..Default::default() };
        let doc = Document::parse_with_options(text, xml_opts)
            .map_err(|e| Error::XsdParse(format!("XML: {e}")))?;

        let root = doc.root_element();
        if !is_xs(root, "schema") {
            return Err(Error::XsdParse("Root element must be xs:schema".to_string()));
        }

        let target_namespace = root
            .attribute("targetNamespace")
            .or(namespace_hint)
            .map(str::to_string);

        Ok(Self { doc, target_namespace })
    }

    /// Der `xs:schema` Knoten.
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Deklarierter oder per Hint gesetzter Target Namespace.
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Zeile/Spalte eines Knotens in diesem Dokument.
    pub fn position(&self, node: Node<'_, '_>) -> TextPos {
        self.doc.text_pos_at(node.range().start)
    }

    /// Erstes globales `xs:element` mit diesem Namen.
    pub fn find_element(&self, name: &str) -> Option<Node<'_, 'input>> {
        find_global(self.root(), &["element"], name)
    }

    /// Alle globalen `complexType`/`simpleType` Definitionen mit diesem Namen,
    /// in Dokumentreihenfolge.
    pub fn find_type_by_name(&self, name: &str) -> Vec<Node<'_, 'input>> {
        xs_children(self.root())
            .filter(|n| matches!(n.tag_name().name(), "complexType" | "simpleType"))
            .filter(|n| n.attribute("name") == Some(name))
            .collect()
    }

    /// Erste globale Model Group (`xs:group name=...`).
    pub fn find_group(&self, name: &str) -> Option<Node<'_, 'input>> {
        find_global(self.root(), &["group"], name)
    }
}

fn find_global<'a, 'i>(root: Node<'a, 'i>, tags: &[&str], name: &str) -> Option<Node<'a, 'i>> {
    xs_children(root)
        .find(|n| tags.contains(&n.tag_name().name()) && n.attribute("name") == Some(name))
}

/// Prüft ob `node` das XSD-Element `xs:{local}` ist.
pub fn is_xs(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NS)
        && node.tag_name().name() == local
}

/// Element-Kinder im XSD-Namespace.
pub fn xs_children<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XS_NS))
}

/// Erstes Kind `xs:{local}`.
pub fn xs_child<'a, 'i>(node: Node<'a, 'i>, local: &str) -> Option<Node<'a, 'i>> {
    xs_children(node).find(|n| n.tag_name().name() == local)
}

/// Löst einen QName-String aus einem Attributwert auf (type, ref, base, xsi:type).
///
/// Prefixe werden gegen die im Knoten sichtbaren Namespace-Deklarationen
/// aufgelöst (roxmltree vererbt Namespaces automatisch). Der Prefix "xml"
/// ist implizit immer definiert. Unpräfixierte Namen gehören zum
/// Default-Namespace des Knotens, sonst zu keinem Namespace.
///
/// `None` wenn der Prefix nicht gebunden ist.
pub fn resolve_qname(value: &str, node: Node<'_, '_>) -> Option<QName> {
    let value = value.trim();
    match value.split_once(':') {
        Some(("xml", local)) => Some(QName::with_prefix(XML_NS, local, "xml")),
        Some((prefix, local)) => {
            let uri = node.lookup_namespace_uri(Some(prefix))?;
            Some(QName::with_prefix(uri, local, prefix))
        }
        None => {
            let uri = node.lookup_namespace_uri(None).unwrap_or("");
            Some(QName::new(uri, value))
        }
    }
}

/// Liest eine Typ-Referenz aus einem Attribut (`type="ns:Foo"`, `xsi:type`).
pub fn get_type_from_node_attr(
    node: Node<'_, '_>,
    attr: &str,
    attr_ns: Option<&str>,
) -> Option<QName> {
    let value = match attr_ns {
        Some(ns) => node.attribute((ns, attr)),
        None => node.attribute(attr),
    }?;
    let qname = resolve_qname(value, node);
    if qname.is_none() {
        log::debug!("unbound prefix in {attr}=\"{value}\"");
    }
    qname
}

/// Eingebettete anonyme Typ-Definition eines Elements.
pub fn get_embedded_type<'a, 'i>(node: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    xs_children(node).find(|n| matches!(n.tag_name().name(), "complexType" | "simpleType"))
}

/// Läuft die Element-Vorfahren von `node` ab (ohne `node` selbst) und liefert
/// den nächsten, für den `predicate` wahr ist.
///
/// Das Prädikat sieht jeden besuchten Vorfahren, auch den Treffer, sodass der
/// Aufrufer den Pfad mitschreiben kann.
pub fn first_filtered_ancestor<'a, 'i, F>(node: Node<'a, 'i>, mut predicate: F) -> Option<Node<'a, 'i>>
where
    F: FnMut(Node<'a, 'i>) -> bool,
{
    node.ancestors()
        .skip(1)
        .filter(Node::is_element)
        .find(|&n| predicate(n))
}

/// Inhaltsmodell eines complexType: `simpleContent`/`complexContent` oder
/// der Typ selbst.
pub fn get_complex_type_content<'a, 'i>(node: Node<'a, 'i>) -> Node<'a, 'i> {
    xs_children(node)
        .find(|n| matches!(n.tag_name().name(), "simpleContent" | "complexContent"))
        .unwrap_or(node)
}

/// `xs:restriction` eines Typs: direkt (simpleType) oder im Content-Wrapper
/// (complexType).
pub fn find_restriction<'a, 'i>(node: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    xs_child(node, "restriction").or_else(|| {
        if is_xs(node, "complexType") {
            xs_child(get_complex_type_content(node), "restriction")
        } else {
            None
        }
    })
}

/// Facet-Knoten der Restriction eines Typs.
pub fn find_restricting_facets<'a>(node: Node<'a, 'a>) -> Vec<Facet<'a>> {
    find_restriction(node)
        .map(|r| r.children().filter_map(Facet::from_node).collect())
        .unwrap_or_default()
}

/// Knoten, unter dem die Partikel eines complexType auf dieser Ebene stehen.
fn particle_container<'a, 'i>(node: Node<'a, 'i>) -> Node<'a, 'i> {
    let content = get_complex_type_content(node);
    if is_xs(content, "complexContent") {
        xs_children(content)
            .find(|n| matches!(n.tag_name().name(), "extension" | "restriction"))
            .unwrap_or(content)
    } else {
        content
    }
}

/// Element-Partikel (und `xs:group ref` Partikel) die auf genau dieser
/// Ebene deklariert sind, in Dokumentreihenfolge.
///
/// Steigt durch `sequence`/`choice`/`all` ab, aber nicht in die Typen
/// lokaler Elemente. Funktioniert auch für `xs:group` Definitionen.
pub fn get_complex_type_elements<'a, 'i>(node: Node<'a, 'i>) -> Vec<Node<'a, 'i>> {
    let container = if is_xs(node, "group") { node } else { particle_container(node) };
    let mut out = Vec::new();
    collect_particles(container, &mut out);
    out
}

fn collect_particles<'a, 'i>(container: Node<'a, 'i>, out: &mut Vec<Node<'a, 'i>>) {
    for child in xs_children(container) {
        match child.tag_name().name() {
            "element" => out.push(child),
            "group" if child.has_attribute("ref") => out.push(child),
            "sequence" | "choice" | "all" => collect_particles(child, out),
            _ => {}
        }
    }
}

/// XSD 1.1 `xs:assert` Knoten eines complexType auf dieser Ebene.
pub fn get_complex_type_asserts<'a, 'i>(node: Node<'a, 'i>) -> Vec<Node<'a, 'i>> {
    let mut out: Vec<_> = xs_children(node).filter(|n| n.tag_name().name() == "assert").collect();
    let content = get_complex_type_content(node);
    if content != node {
        for derivation in xs_children(content)
            .filter(|n| matches!(n.tag_name().name(), "extension" | "restriction"))
        {
            out.extend(xs_children(derivation).filter(|n| n.tag_name().name() == "assert"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKS: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:tns="http://example.org/books"
                   targetNamespace="http://example.org/books">
            <xs:element name="book" type="tns:BookType"/>
            <xs:complexType name="BookType">
                <xs:sequence>
                    <xs:element name="title" type="xs:string"/>
                    <xs:choice>
                        <xs:element name="isbn" type="xs:string"/>
                        <xs:group ref="tns:Ids"/>
                    </xs:choice>
                    <xs:any/>
                </xs:sequence>
                <xs:assert test="count(*) gt 0"/>
            </xs:complexType>
            <xs:simpleType name="BookType">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
            <xs:group name="Ids">
                <xs:sequence>
                    <xs:element name="doi" type="xs:string"/>
                </xs:sequence>
            </xs:group>
        </xs:schema>
    "#;

    #[test]
    fn parse_rejects_non_schema_root() {
        let err = SchemaTree::parse(r#"<element xmlns="http://www.w3.org/2001/XMLSchema"/>"#)
            .unwrap_err();
        assert!(matches!(err, Error::XsdParse(_)));
    }

    #[test]
    fn parse_rejects_invalid_xml() {
        assert!(matches!(
            SchemaTree::parse("<xs:schema><not-closed>"),
            Err(Error::XsdParse(_))
        ));
    }

    #[test]
    fn size_limit_enforced() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
        let err = SchemaTree::parse_with_options(xsd, None, 10).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn namespace_hint_only_applies_without_declaration() {
        let bare = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
        let tree = SchemaTree::parse_with_namespace(bare, Some("urn:hint")).unwrap();
        assert_eq!(tree.target_namespace(), Some("urn:hint"));

        let tree = SchemaTree::parse_with_namespace(BOOKS, Some("urn:hint")).unwrap();
        assert_eq!(tree.target_namespace(), Some("http://example.org/books"));

        assert_eq!(SchemaTree::parse(bare).unwrap().target_namespace(), None);
    }

    #[test]
    fn find_type_by_name_returns_all_kinds() {
        let tree = SchemaTree::parse(BOOKS).unwrap();
        let found = tree.find_type_by_name("BookType");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].tag_name().name(), "complexType");
        assert_eq!(found[1].tag_name().name(), "simpleType");
        assert!(tree.find_type_by_name("Missing").is_empty());
    }

    #[test]
    fn resolve_prefixes() {
        let tree = SchemaTree::parse(BOOKS).unwrap();
        let book = tree.find_element("book").unwrap();
        let ty = get_type_from_node_attr(book, "type", None).unwrap();
        assert!(ty.matches("http://example.org/books", "BookType"));

        let xml = resolve_qname("xml:lang", book).unwrap();
        assert!(xml.matches(XML_NS, "lang"));

        assert!(resolve_qname("nope:T", book).is_none());
        assert!(get_type_from_node_attr(book, "missing", None).is_none());
    }

    #[test]
    fn unprefixed_uses_default_namespace() {
        let xsd = r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema">
                <element name="e" type="string"/>
            </schema>
        "#;
        let tree = SchemaTree::parse(xsd).unwrap();
        let e = tree.find_element("e").unwrap();
        assert!(get_type_from_node_attr(e, "type", None).unwrap().matches(XS_NS, "string"));
    }

    #[test]
    fn particles_descend_through_compositors() {
        let tree = SchemaTree::parse(BOOKS).unwrap();
        let ct = tree.find_type_by_name("BookType")[0];
        let names: Vec<_> = get_complex_type_elements(ct)
            .iter()
            .map(|n| n.attribute("name").or(n.attribute("ref")).unwrap())
            .collect();
        assert_eq!(names, ["title", "isbn", "tns:Ids"]);

        let group = tree.find_group("Ids").unwrap();
        let in_group: Vec<_> = get_complex_type_elements(group)
            .iter()
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(in_group, ["doi"]);
    }

    #[test]
    fn asserts_on_type_and_derivation() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:complexType name="T">
                    <xs:complexContent>
                        <xs:extension base="xs:anyType">
                            <xs:assert test="@a"/>
                        </xs:extension>
                    </xs:complexContent>
                    <xs:assert test="@b"/>
                </xs:complexType>
            </xs:schema>
        "#;
        let tree = SchemaTree::parse(xsd).unwrap();
        let asserts = get_complex_type_asserts(tree.find_type_by_name("T")[0]);
        let tests: Vec<_> = asserts.iter().filter_map(|n| n.attribute("test")).collect();
        assert_eq!(tests, ["@b", "@a"]);
    }

    #[test]
    fn first_filtered_ancestor_reports_every_visit() {
        let doc = roxmltree::Document::parse("<a x='1'><b><c><d/></c></b></a>").unwrap();
        let d = doc.descendants().find(|n| n.has_tag_name("d")).unwrap();
        let mut seen = Vec::new();
        let hit = first_filtered_ancestor(d, |n| {
            seen.push(n.tag_name().name());
            n.has_attribute("x")
        });
        assert_eq!(hit.unwrap().tag_name().name(), "a");
        assert_eq!(seen, ["c", "b", "a"]);
    }

    #[test]
    fn embedded_type_and_restriction() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="size">
                    <xs:simpleType>
                        <xs:restriction base="xs:int">
                            <xs:minInclusive value="1"/>
                            <xs:maxInclusive value="9"/>
                        </xs:restriction>
                    </xs:simpleType>
                </xs:element>
            </xs:schema>
        "#;
        let tree = SchemaTree::parse(xsd).unwrap();
        let size = tree.find_element("size").unwrap();
        let anon = get_embedded_type(size).unwrap();
        assert!(is_xs(anon, "simpleType"));
        assert_eq!(find_restricting_facets(anon).len(), 2);
        assert!(find_restriction(size).is_none());
    }
}
