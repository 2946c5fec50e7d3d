#![no_main]
use libfuzzer_sys::fuzz_target;
use xsd_catalog::{CatalogConfig, SchemaCatalog, SchemaTree};

// Eingabe: Schema und Instanzdokument, getrennt durch ein NUL-Byte.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let (xsd, xml) = text.split_once('\0').unwrap_or((text, ""));

    let Ok(tree) = SchemaTree::parse_with_namespace(xsd, Some("urn:fuzz")) else { return };
    let config = CatalogConfig::default().with_max_chain_depth(16);
    let Ok(catalog) = SchemaCatalog::with_config([&tree], config) else { return };

    for node in tree.root().children().filter(|n| n.is_element()) {
        let Some(name) = node.attribute("name") else { continue };
        if let Some(ty) = catalog.find_type_by_name("urn:fuzz", name) {
            let _ = catalog.find_base_type_for(&ty);
            let _ = catalog.collect_facets(&ty);
            let _ = catalog.get_complex_type_elements(&ty);
        }
        if let Some(element) = catalog.find_element("urn:fuzz", name) {
            let _ = catalog.find_element_type(&element);
        }
    }

    if let Ok(doc) = roxmltree::Document::parse(xml) {
        for node in doc.descendants() {
            let _ = catalog.find_type_for_xml_node(node);
        }
    }
});
