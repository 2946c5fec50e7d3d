//! Restriction- und Extension-Ketten.

use crate::error::{ChainKind, Error, Result};
use crate::XS_NS;
use crate::node::{SchemaNode, SchemaNodeKind};
use crate::qname::QName;
use crate::tree::{self, is_xs, xs_child};

use super::{ChainGuard, SchemaCatalog};

impl<'a> SchemaCatalog<'a> {
    /// Basistyp aus der `xs:restriction` eines Typs.
    ///
    /// Die Restriction steht bei simpleTypes direkt unter dem Typ, bei
    /// complexTypes im `simpleContent`/`complexContent`. Ohne `base` gilt
    /// ein eingebetteter anonymer simpleType als Basis.
    ///
    /// `list`/`union` Ableitungen sind keine Restriction und liefern
    /// [`Error::UnsupportedDerivationKind`]. Ausgenommen sind die Built-in
    /// Listentypen (`NMTOKENS`, `IDREFS`, `ENTITIES`): sie beenden die Kette.
    pub fn find_restricted_type(&self, node: &SchemaNode<'a>) -> Result<Option<SchemaNode<'a>>> {
        if node.kind() == SchemaNodeKind::SimpleType && &**node.target_namespace() != XS_NS {
            for kind in ["list", "union"] {
                if xs_child(node.node(), kind).is_some() {
                    return Err(Error::UnsupportedDerivationKind {
                        name: node.name().unwrap_or_default().to_string(),
                        kind,
                    });
                }
            }
        }

        let Some(restriction) = tree::find_restriction(node.node()) else {
            return Ok(None);
        };
        match restriction.attribute("base") {
            Some(base) => {
                let Some(qname) = tree::resolve_qname(base, restriction) else {
                    log::debug!("unbound prefix in restriction base=\"{base}\"");
                    return Ok(None);
                };
                Ok(self.find_type(&qname))
            }
            None => Ok(xs_child(restriction, "simpleType").map(|n| node.sibling(n))),
        }
    }

    /// Basistyp aus der `xs:extension` im Content-Modell eines complexType.
    pub fn find_extended_type(&self, node: &SchemaNode<'a>) -> Option<SchemaNode<'a>> {
        if node.kind() != SchemaNodeKind::ComplexType {
            return None;
        }
        let content = tree::get_complex_type_content(node.node());
        let extension = xs_child(content, "extension")?;
        let qname = tree::resolve_qname(extension.attribute("base")?, extension)?;
        self.find_type(&qname)
    }

    /// Alle Typen der Restriction-Kette ab `node` (einschließlich), bis ein
    /// Typ keine weitere Restriction-Basis hat.
    pub fn restriction_chain(&self, node: &SchemaNode<'a>) -> Result<Vec<SchemaNode<'a>>> {
        let mut guard = ChainGuard::new(ChainKind::Restriction, &self.config);
        guard.visit(node)?;
        let mut chain = vec![node.clone()];
        let mut current = node.clone();
        while let Some(base) = self.find_restricted_type(&current)? {
            guard.visit(&base)?;
            chain.push(base.clone());
            current = base;
        }
        Ok(chain)
    }

    /// Name des Endpunkts der Restriction-Kette, typischerweise ein
    /// primitiver Built-in (`string`, `decimal`, `dateTime`, ...).
    ///
    /// Ohne Restriction ist das der Name von `node` selbst; `None` nur für
    /// einen anonymen Typ ohne Restriction.
    pub fn find_base_type_for(&self, node: &SchemaNode<'a>) -> Result<Option<&'a str>> {
        let chain = self.restriction_chain(node)?;
        Ok(chain.last().and_then(SchemaNode::name))
    }

    /// Element-Partikel eines complexType und aller per Extension geerbten
    /// Typen, vom abgeleitetsten zum Basistyp. Keine Deduplizierung.
    ///
    /// `xs:group ref` Partikel werden an Ort und Stelle expandiert. Partikel
    /// und Expansionen zusammen sind durch
    /// [`CatalogConfig::max_expanded_particles`](crate::CatalogConfig::max_expanded_particles)
    /// begrenzt.
    pub fn get_complex_type_elements(&self, complex_type: &SchemaNode<'a>) -> Result<Vec<SchemaNode<'a>>> {
        let mut out = Vec::new();
        let mut expanded = 0;
        for ty in self.extension_chain(complex_type)? {
            let mut open_groups = Vec::new();
            self.expand_particles(&ty, &mut open_groups, &mut expanded, &mut out)?;
        }
        Ok(out)
    }

    /// XSD 1.1 `xs:assert` Knoten eines complexType und seiner Basistypen.
    pub fn get_complex_type_asserts(&self, complex_type: &SchemaNode<'a>) -> Result<Vec<SchemaNode<'a>>> {
        let mut out = Vec::new();
        for ty in self.extension_chain(complex_type)? {
            out.extend(
                tree::get_complex_type_asserts(ty.node())
                    .into_iter()
                    .map(|n| ty.sibling(n)),
            );
        }
        Ok(out)
    }

    /// `complex_type` und alle Basistypen über `find_extended_type`.
    fn extension_chain(&self, complex_type: &SchemaNode<'a>) -> Result<Vec<SchemaNode<'a>>> {
        let mut guard = ChainGuard::new(ChainKind::Extension, &self.config);
        let mut chain = Vec::new();
        let mut current = Some(complex_type.clone());
        while let Some(ty) = current {
            guard.visit(&ty)?;
            current = self.find_extended_type(&ty);
            chain.push(ty);
        }
        Ok(chain)
    }

    /// Sammelt Element-Partikel von `owner` (complexType oder group).
    ///
    /// `open_groups` ist der Stapel der gerade expandierten Groups; eine
    /// Group, die sich selbst (indirekt) enthält, ist ein Zyklus.
    /// `expanded` zählt Partikel und Expansionen des gesamten Laufs.
    fn expand_particles(
        &self,
        owner: &SchemaNode<'a>,
        open_groups: &mut Vec<QName>,
        expanded: &mut usize,
        out: &mut Vec<SchemaNode<'a>>,
    ) -> Result<()> {
        for particle in tree::get_complex_type_elements(owner.node()) {
            self.charge_particle(owner, expanded)?;
            if !is_xs(particle, "group") {
                out.push(owner.sibling(particle));
                continue;
            }

            let Some(qname) = particle
                .attribute("ref")
                .and_then(|r| tree::resolve_qname(r, particle))
            else {
                continue;
            };
            let Some(group) = self.find_group(&qname.uri, &qname.local_name) else {
                log::debug!("group {qname} not found, particle skipped");
                continue;
            };
            if open_groups.contains(&qname) || open_groups.len() >= self.config.max_chain_depth() {
                return Err(Error::malformed_chain(ChainKind::Group, &qname, open_groups.len()));
            }
            open_groups.push(qname);
            self.expand_particles(&group, open_groups, expanded, out)?;
            open_groups.pop();
        }
        Ok(())
    }

    fn charge_particle(&self, owner: &SchemaNode<'a>, expanded: &mut usize) -> Result<()> {
        *expanded += 1;
        let budget = self.config.max_expanded_particles();
        if *expanded > budget {
            let label = owner
                .qname()
                .map(|q| q.to_string())
                .unwrap_or_else(|| "<anonymous>".to_string());
            log::warn!("group expansion exceeds {budget} particles at {label}");
            return Err(Error::malformed_chain(ChainKind::Group, label, *expanded));
        }
        Ok(())
    }
}
