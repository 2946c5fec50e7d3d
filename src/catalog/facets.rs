//! Facet-Sammlung entlang der Restriction-Kette.

use crate::FastHashSet;
use crate::error::Result;
use crate::facet::{FacetGroup, FacetKind};
use crate::node::SchemaNode;
use crate::tree;

use super::SchemaCatalog;

impl<'a> SchemaCatalog<'a> {
    /// Sammelt die Facets eines Typs und aller Restriction-Basistypen.
    ///
    /// Override-Regeln, von innen (abgeleitet) nach außen (Basis):
    ///
    /// - Eine nicht-fixe Facet-Art, die auf einer Ebene deklariert ist,
    ///   verdrängt dieselbe Art auf allen weiter außen liegenden Ebenen.
    ///   Mehrere gleichartige Facets auf derselben Ebene (z.B. `pattern`)
    ///   bleiben alle erhalten.
    /// - Fixe Facets (`fixed="true"`, `assertion`) werden immer übernommen
    ///   und verdrängen nichts.
    /// - `enumeration` akkumuliert über alle Ebenen.
    ///
    /// Ergebnis: eine [`FacetGroup`] pro Ebene mit mindestens einem Facet,
    /// nächste Ebene zuerst.
    pub fn collect_facets(&self, simple_type: &SchemaNode<'a>) -> Result<Vec<FacetGroup<'a>>> {
        let mut overridden: FastHashSet<FacetKind> = FastHashSet::default();
        let mut groups = Vec::new();

        for (level, ty) in self.restriction_chain(simple_type)?.iter().enumerate() {
            let mut facets = Vec::new();
            let mut declared = Vec::new();

            for facet in tree::find_restricting_facets(ty.node()) {
                let kind = facet.kind();
                if kind == FacetKind::Enumeration || facet.is_fixed() {
                    facets.push(facet);
                } else if !overridden.contains(&kind) {
                    facets.push(facet);
                    declared.push(kind);
                } else {
                    log::trace!("{kind} at level {level} overridden by a derived type");
                }
            }

            overridden.extend(declared);
            if !facets.is_empty() {
                groups.push(FacetGroup { level, type_name: ty.name(), facets });
            }
        }

        Ok(groups)
    }
}
