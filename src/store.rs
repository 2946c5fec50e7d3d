//! Namespace → registered schema documents.

use std::rc::Rc;

use crate::FastIndexMap;
use crate::tree::SchemaTree;

/// Ordered buckets of schema documents, keyed by namespace URI.
///
/// Innerhalb eines Buckets ist die Registrierungsreihenfolge die
/// Suchreihenfolge. Buckets werden nie entfernt.
#[derive(Debug, Default)]
pub struct NamespaceStore<'a> {
    buckets: FastIndexMap<Rc<str>, Vec<&'a SchemaTree<'a>>>,
}

impl<'a> NamespaceStore<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prüft ob für `namespace` ein Bucket existiert.
    pub fn exists(&self, namespace: &str) -> bool {
        self.buckets.contains_key(namespace)
    }

    /// Bucket-Schlüssel und registrierte Dokumente für `namespace`.
    pub fn get(&self, namespace: &str) -> Option<(&Rc<str>, &[&'a SchemaTree<'a>])> {
        self.buckets
            .get_key_value(namespace)
            .map(|(k, v)| (k, v.as_slice()))
    }

    /// Hängt ein Dokument an den Bucket an (legt ihn bei Bedarf an).
    pub fn set(&mut self, namespace: &str, tree: &'a SchemaTree<'a>) {
        if let Some(bucket) = self.buckets.get_mut(namespace) {
            bucket.push(tree);
        } else {
            self.buckets.insert(Rc::from(namespace), vec![tree]);
        }
    }

    /// Alle Namespaces in Registrierungsreihenfolge.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(|k| &**k)
    }

    /// Anzahl registrierter Dokumente in allen Buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
