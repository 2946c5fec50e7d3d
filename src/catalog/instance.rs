//! Abbildung von Instanz-Knoten auf Schema-Definitionen.

use roxmltree::Node;

use crate::error::Result;
use crate::node::{SchemaNode, SchemaNodeKind};
use crate::qname::QName;
use crate::tree::first_filtered_ancestor;
use crate::XSI_NS;

use super::SchemaCatalog;

fn has_xsi_type(node: Node<'_, '_>) -> bool {
    node.has_attribute((XSI_NS, "type"))
}

impl<'a> SchemaCatalog<'a> {
    /// Findet die `xs:element` Definition, die ein Instanz-Element regelt.
    ///
    /// Vorgehen: Vorfahren von innen nach außen sammeln, bis einschließlich
    /// des nächsten Vorfahren mit `xsi:type` (sonst bis zum Wurzelelement).
    /// Der äußerste Vorfahr wird über `xsi:type` bzw. als globales Element
    /// aufgelöst, danach wird Ebene für Ebene per
    /// [`find_xsd_sub_node`](Self::find_xsd_sub_node) abgestiegen.
    ///
    /// `Ok(None)` heißt: das Dokument passt an dieser Stelle zu keiner
    /// bekannten Definition.
    pub fn find_element_for_xml_node(&self, instance: Node<'_, '_>) -> Result<Option<SchemaNode<'a>>> {
        if !instance.is_element() {
            return Ok(None);
        }

        let mut ancestors = Vec::new();
        let typed = first_filtered_ancestor(instance, |n| {
            ancestors.push(n);
            has_xsi_type(n)
        });
        ancestors.reverse();

        let Some((&outer, inner)) = ancestors.split_first() else {
            let qname = QName::of_element(instance);
            return Ok(self.find_element(&qname.uri, &qname.local_name));
        };

        let start = if typed.is_some() {
            self.find_type_definition_from_node_attr(outer, "type", Some(XSI_NS))
        } else {
            let qname = QName::of_element(outer);
            self.find_element(&qname.uri, &qname.local_name)
        };
        let Some(mut current) = start else {
            log::debug!("no definition for outermost ancestor <{}>", outer.tag_name().name());
            return Ok(None);
        };

        for &step in inner.iter().chain(std::iter::once(&instance)) {
            let qname = QName::of_element(step);
            match self.find_xsd_sub_node(&current, &qname)? {
                Some(next) => current = next,
                None => {
                    log::debug!("{qname} not declared in {current}");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    /// Effektiver Typ eines Instanz-Elements: `xsi:type` am Element selbst,
    /// sonst der Typ seiner Element-Definition.
    pub fn find_type_for_xml_node(&self, instance: Node<'_, '_>) -> Result<Option<SchemaNode<'a>>> {
        if instance.is_element() && has_xsi_type(instance) {
            return Ok(self.find_type_definition_from_node_attr(instance, "type", Some(XSI_NS)));
        }
        Ok(self
            .find_element_for_xml_node(instance)?
            .and_then(|element| self.find_element_type(&element)))
    }

    /// Steigt eine Ebene in eine Definition ab.
    ///
    /// Ist `definition` ein Element, wird zuerst auf dessen Typ umgelenkt.
    /// Gesucht wird im (geerbten) Inhaltsmodell des complexType nach einem
    /// Element-Partikel mit genau diesem QName; `ref` Partikel liefern die
    /// referenzierte globale Deklaration.
    pub fn find_xsd_sub_node(&self, definition: &SchemaNode<'a>, name: &QName) -> Result<Option<SchemaNode<'a>>> {
        let ty = match definition.kind() {
            SchemaNodeKind::Element => match self.find_element_type(definition) {
                Some(ty) => ty,
                None => return Ok(None),
            },
            SchemaNodeKind::ComplexType => definition.clone(),
            _ => return Ok(None),
        };
        if ty.kind() != SchemaNodeKind::ComplexType {
            return Ok(None);
        }

        for particle in self.get_complex_type_elements(&ty)? {
            if particle.qname().as_ref() != Some(name) {
                continue;
            }
            if particle.node().has_attribute("ref") {
                return Ok(self.find_element(&name.uri, &name.local_name));
            }
            return Ok(Some(particle));
        }
        Ok(None)
    }
}
