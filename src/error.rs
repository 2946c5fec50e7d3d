//! Central error types for schema loading and type resolution.
//!
//! "Nicht gefunden" ist kein Fehler: Lookups liefern `Option::None`.
//! Fehler sind nur strukturelle Probleme, die ein Aufrufer nicht durch
//! einfaches Verzweigen behandeln kann.

use core::fmt;

/// Art der Ableitungskette, in der ein [`Error::MalformedChain`] auftrat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// simpleType/complexType restriction chain.
    Restriction,
    /// complexType extension chain.
    Extension,
    /// Verschachtelte `xs:group ref` Auflösung.
    Group,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restriction => f.write_str("restriction"),
            Self::Extension => f.write_str("extension"),
            Self::Group => f.write_str("group"),
        }
    }
}

/// All errors surfaced by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A schema document has no target namespace and none was supplied.
    InvalidSchema(String),
    /// A derivation walk revisited a definition or exceeded the depth bound.
    MalformedChain {
        /// Welche Kette gelaufen ist.
        chain: ChainKind,
        /// Definition, bei der abgebrochen wurde (`{uri}local`).
        name: String,
        /// Anzahl der bis dahin gegangenen Schritte.
        depth: usize,
    },
    /// A restriction walk reached a `list` or `union` derivation.
    UnsupportedDerivationKind {
        /// Name des Typs (leer bei anonymen Typen).
        name: String,
        /// `list` oder `union`.
        kind: &'static str,
    },
    /// XSD document could not be read or parsed into a tree.
    XsdParse(String),
    /// Schema-Datei konnte nicht gelesen werden.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSchema(msg) => write!(f, "invalid schema: {msg}"),
            Self::MalformedChain { chain, name, depth } => write!(
                f,
                "malformed {chain} chain at '{name}' after {depth} step(s) (cycle or depth limit)"
            ),
            Self::UnsupportedDerivationKind { name, kind } => {
                if name.is_empty() {
                    write!(f, "unsupported derivation kind '{kind}' on anonymous simpleType")
                } else {
                    write!(f, "unsupported derivation kind '{kind}' on simpleType '{name}'")
                }
            }
            Self::XsdParse(msg) => write!(f, "XSD parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl Error {
    /// Erstellt einen `MalformedChain` Fehler.
    pub fn malformed_chain(chain: ChainKind, name: impl fmt::Display, depth: usize) -> Self {
        Self::MalformedChain {
            chain,
            name: name.to_string(),
            depth,
        }
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
