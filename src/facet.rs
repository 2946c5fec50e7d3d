//! Constraining facets (XSD 1.1 Part 2 §4.3).
//!
//! Ein Facet ist ein Kind-Element einer `xs:restriction`. Der Katalog sammelt
//! Facets entlang der Restriction-Kette in [`FacetGroup`]s, eine Gruppe pro
//! Ableitungsebene.

use std::fmt;

use roxmltree::Node;

use crate::XS_NS;

/// Facet kinds recognised inside `xs:restriction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    Length,
    MinLength,
    MaxLength,
    Pattern,
    Enumeration,
    WhiteSpace,
    MaxInclusive,
    MaxExclusive,
    MinInclusive,
    MinExclusive,
    TotalDigits,
    FractionDigits,
    /// XSD 1.1 `xs:assertion`, gilt immer als fixed.
    Assertion,
    /// XSD 1.1 `xs:explicitTimezone`.
    ExplicitTimezone,
}

impl FacetKind {
    /// Ordnet einen XSD local-name einem Facet zu.
    pub fn from_local_name(name: &str) -> Option<Self> {
        Some(match name {
            "length" => Self::Length,
            "minLength" => Self::MinLength,
            "maxLength" => Self::MaxLength,
            "pattern" => Self::Pattern,
            "enumeration" => Self::Enumeration,
            "whiteSpace" => Self::WhiteSpace,
            "maxInclusive" => Self::MaxInclusive,
            "maxExclusive" => Self::MaxExclusive,
            "minInclusive" => Self::MinInclusive,
            "minExclusive" => Self::MinExclusive,
            "totalDigits" => Self::TotalDigits,
            "fractionDigits" => Self::FractionDigits,
            "assertion" => Self::Assertion,
            "explicitTimezone" => Self::ExplicitTimezone,
            _ => return None,
        })
    }

    /// Der XSD local-name des Facets.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::Enumeration => "enumeration",
            Self::WhiteSpace => "whiteSpace",
            Self::MaxInclusive => "maxInclusive",
            Self::MaxExclusive => "maxExclusive",
            Self::MinInclusive => "minInclusive",
            Self::MinExclusive => "minExclusive",
            Self::TotalDigits => "totalDigits",
            Self::FractionDigits => "fractionDigits",
            Self::Assertion => "assertion",
            Self::ExplicitTimezone => "explicitTimezone",
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One facet node of a restriction.
#[derive(Debug, Clone, Copy)]
pub struct Facet<'a> {
    kind: FacetKind,
    node: Node<'a, 'a>,
}

impl<'a> Facet<'a> {
    /// Klassifiziert ein XSD-Element als Facet; `None` für alles andere
    /// (annotation, simpleType, attribute, ...).
    pub fn from_node(node: Node<'a, 'a>) -> Option<Self> {
        if !node.is_element() || node.tag_name().namespace() != Some(XS_NS) {
            return None;
        }
        FacetKind::from_local_name(node.tag_name().name()).map(|kind| Self { kind, node })
    }

    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// Das `value` Attribut (bei `assertion` der `test` Ausdruck).
    pub fn value(&self) -> Option<&'a str> {
        match self.kind {
            FacetKind::Assertion => self.node.attribute("test"),
            _ => self.node.attribute("value"),
        }
    }

    /// `fixed="true"` (bzw. `"1"`), `assertion` ist immer fixed.
    pub fn is_fixed(&self) -> bool {
        self.kind == FacetKind::Assertion
            || matches!(self.node.attribute("fixed").map(str::trim), Some("true" | "1"))
    }

    /// Der zugrunde liegende Schema-Knoten.
    pub fn node(&self) -> Node<'a, 'a> {
        self.node
    }
}

/// Facets contributed by one level of a restriction chain.
#[derive(Debug, Clone)]
pub struct FacetGroup<'a> {
    /// 0 = der Ausgangstyp, 1 = dessen Basistyp, ...
    pub level: usize,
    /// Name des Typs dieser Ebene (`None` bei anonymen Typen).
    pub type_name: Option<&'a str>,
    /// Beibehaltene Facets in Dokumentreihenfolge.
    pub facets: Vec<Facet<'a>>,
}

impl<'a> FacetGroup<'a> {
    /// Alle Facets einer Art in dieser Gruppe.
    pub fn of_kind(&self, kind: FacetKind) -> impl Iterator<Item = &Facet<'a>> {
        self.facets.iter().filter(move |f| f.kind == kind)
    }

    /// Die Enumeration-Werte dieser Ebene.
    pub fn enumerations(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.of_kind(FacetKind::Enumeration).filter_map(Facet::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_facet_nodes() {
        let xsd = r#"
            <xs:restriction xmlns:xs="http://www.w3.org/2001/XMLSchema" base="xs:string">
                <xs:annotation/>
                <xs:maxLength value="10" fixed="true"/>
                <xs:pattern value="[a-z]+"/>
                <xs:assertion test="string-length($value) gt 1"/>
            </xs:restriction>
        "#;
        let doc = roxmltree::Document::parse(xsd).unwrap();
        let facets: Vec<_> = doc
            .root_element()
            .children()
            .filter_map(Facet::from_node)
            .collect();

        assert_eq!(facets.len(), 3);
        assert_eq!(facets[0].kind(), FacetKind::MaxLength);
        assert!(facets[0].is_fixed());
        assert_eq!(facets[0].value(), Some("10"));
        assert!(!facets[1].is_fixed());
        assert!(facets[2].is_fixed());
        assert_eq!(facets[2].value(), Some("string-length($value) gt 1"));
    }

    #[test]
    fn foreign_namespace_is_not_a_facet() {
        let doc = roxmltree::Document::parse(r#"<pattern xmlns="urn:other" value="x"/>"#).unwrap();
        assert!(Facet::from_node(doc.root_element()).is_none());
    }

    #[test]
    fn kind_names_round_trip() {
        for name in ["length", "totalDigits", "explicitTimezone", "whiteSpace"] {
            assert_eq!(FacetKind::from_local_name(name).unwrap().as_str(), name);
        }
        assert!(FacetKind::from_local_name("annotation").is_none());
    }
}
