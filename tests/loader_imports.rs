//! Laden über import/include aus `tests/fixtures/` und Auflösung darauf.

use std::path::PathBuf;

use xsd_catalog::{ChainKind, Error, FacetKind, QName, SchemaCatalog, SchemaSources};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn nth_element<'a, 'i>(doc: &'a roxmltree::Document<'i>, name: &str, n: usize) -> roxmltree::Node<'a, 'i> {
    doc.descendants().filter(|e| e.has_tag_name(name)).nth(n).unwrap()
}

#[test]
fn loads_imports_and_chameleon_include() {
    let sources = SchemaSources::load(fixture("library.xsd")).unwrap();
    let files: Vec<_> = sources
        .iter()
        .map(|s| s.path().unwrap().file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(files, ["library.xsd", "types.xsd", "common.xsd"]);

    let trees = sources.parse().unwrap();
    let catalog = SchemaCatalog::new(&trees).unwrap();
    let namespaces: Vec<_> = catalog.namespaces().collect();
    assert_eq!(
        namespaces,
        ["http://www.w3.org/2001/XMLSchema", "urn:library", "urn:types"]
    );

    // Person stammt aus dem Chameleon-Include
    let person = catalog.find_type_by_name("urn:library", "Person").unwrap();
    let elements = catalog.get_complex_type_elements(&person).unwrap();
    assert_eq!(elements[0].qname().unwrap(), QName::new("urn:library", "name"));
}

#[test]
fn resolves_instance_document() {
    let sources = SchemaSources::load(fixture("library.xsd")).unwrap();
    let trees = sources.parse().unwrap();
    let catalog = SchemaCatalog::new(&trees).unwrap();

    let xml = std::fs::read_to_string(fixture("library.xml")).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();

    // price kommt über die Model Group Pricing
    let price = nth_element(&doc, "price", 0);
    let ty = catalog.find_type_for_xml_node(price).unwrap().unwrap();
    assert_eq!(ty.qname().unwrap(), QName::new("urn:types", "Price"));
    assert_eq!(catalog.find_base_type_for(&ty).unwrap(), Some("decimal"));

    // format nur über xsi:type="lib:EBook"
    let format = nth_element(&doc, "format", 0);
    let decl = catalog.find_element_for_xml_node(format).unwrap().unwrap();
    let ty = catalog.find_element_type(&decl).unwrap();
    let groups = catalog.collect_facets(&ty).unwrap();
    assert_eq!(groups[0].enumerations().collect::<Vec<_>>(), ["epub", "pdf"]);

    let name = nth_element(&doc, "name", 1);
    let decl = catalog.find_element_for_xml_node(name).unwrap().unwrap();
    assert_eq!(catalog.find_element_type(&decl).unwrap().name(), Some("string"));

    let magazine = nth_element(&doc, "magazine", 0);
    assert!(catalog.find_element_for_xml_node(magazine).unwrap().is_none());
}

#[test]
fn price_facets_across_files() {
    let sources = SchemaSources::load(fixture("library.xsd")).unwrap();
    let trees = sources.parse().unwrap();
    let catalog = SchemaCatalog::new(&trees).unwrap();

    let price = catalog.find_type_by_name("urn:types", "Price").unwrap();
    let groups = catalog.collect_facets(&price).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].type_name, Some("Amount"));
    // fractionDigits von Amount ist durch Price überschrieben
    assert_eq!(groups[1].of_kind(FacetKind::FractionDigits).count(), 0);
    assert_eq!(groups[1].of_kind(FacetKind::TotalDigits).count(), 1);

    let tags = catalog.find_type_by_name("urn:types", "Tags").unwrap();
    assert!(matches!(
        catalog.find_base_type_for(&tags),
        Err(Error::UnsupportedDerivationKind { kind: "list", .. })
    ));
}

#[test]
fn circular_imports_load_once_and_cycle_is_reported() {
    let sources = SchemaSources::load(fixture("cycle_a.xsd")).unwrap();
    assert_eq!(sources.len(), 2);

    let trees = sources.parse().unwrap();
    let catalog = SchemaCatalog::new(&trees).unwrap();
    let looped = catalog.find_type_by_name("urn:cycle-a", "Loop").unwrap();
    let err = catalog.collect_facets(&looped).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedChain { chain: ChainKind::Restriction, depth: 2, .. }
    ));
}
