//! Namespace-qualified names.
//!
//! Ein QName ist das universelle Lookup-Kriterium des Katalogs: URI und
//! local-name. Der Prefix wird nur für Diagnosen mitgeführt und spielt für
//! Gleichheit, Ordnung und Hash keine Rolle.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::AHasher;

/// A namespace URI plus local name, with an optional prefix.
#[derive(Clone)]
pub struct QName {
    /// The namespace URI. Empty string means no namespace.
    pub uri: Rc<str>,
    /// The local name.
    pub local_name: Rc<str>,
    /// The prefix the name was written with, if any.
    pub prefix: Option<Rc<str>>,
    /// Vorberechneter Hash von (uri, local_name).
    identity: u64,
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QName")
            .field("uri", &self.uri)
            .field("local_name", &self.local_name)
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Berechnet den Identity-Hash für ein QName (uri + local_name).
fn compute_identity(uri: &str, local_name: &str) -> u64 {
    let mut hasher = AHasher::default();
    uri.hash(&mut hasher);
    local_name.hash(&mut hasher);
    hasher.finish()
}

/// Two qnames are equal if URI and local-name match, regardless of prefix.
impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.uri == other.uri
            && self.local_name == other.local_name
    }
}

impl Eq for QName {}

/// Ordering konsistent mit PartialEq: erst URI, dann local_name.
impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri
            .cmp(&other.uri)
            .then_with(|| self.local_name.cmp(&other.local_name))
    }
}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Clark-Notation: `{uri}local`, bzw. nur `local` ohne Namespace.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uri.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.uri, self.local_name)
        }
    }
}

impl QName {
    /// Creates a new QName with the given URI and local-name, without prefix.
    pub fn new(uri: impl Into<Rc<str>>, local_name: impl Into<Rc<str>>) -> Self {
        let uri = uri.into();
        let local_name = local_name.into();
        let identity = compute_identity(&uri, &local_name);
        Self {
            uri,
            local_name,
            prefix: None,
            identity,
        }
    }

    /// Creates a new QName with URI, local-name, and prefix.
    pub fn with_prefix(
        uri: impl Into<Rc<str>>,
        local_name: impl Into<Rc<str>>,
        prefix: impl Into<Rc<str>>,
    ) -> Self {
        let mut qname = Self::new(uri, local_name);
        qname.prefix = Some(prefix.into());
        qname
    }

    /// Prüft ob URI und local-name übereinstimmen.
    pub fn matches(&self, uri: &str, local_name: &str) -> bool {
        &*self.uri == uri && &*self.local_name == local_name
    }

    /// QName eines `roxmltree` Elements (Namespace + Tag-Name).
    pub fn of_element(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        Self::new(tag.namespace().unwrap_or(""), tag.name())
    }
}
