//! Catalog configuration.
//!
//! # Beispiel
//!
//! ```
//! use xsd_catalog::CatalogConfig;
//!
//! let config = CatalogConfig::default().with_max_chain_depth(16);
//! assert_eq!(config.max_chain_depth(), 16);
//! assert_eq!(config.max_schema_size(), 16 * 1024 * 1024);
//! ```

/// Default-Grenze für Ableitungsketten (restriction/extension/group).
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

/// Maximale Größe eines XSD-Dokuments (16 MiB).
pub const DEFAULT_MAX_SCHEMA_SIZE: usize = 16 * 1024 * 1024;

/// Default-Budget für Partikel und Group-Expansionen pro Inhaltsmodell.
pub const DEFAULT_MAX_EXPANDED_PARTICLES: usize = 100_000;

/// Limits applied while loading schemas and walking derivation chains.
///
/// Schema-Dokumente sind nicht vertrauenswürdige Eingaben: beide Grenzen
/// schützen gegen zyklische oder pathologisch tiefe Definitionen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    max_chain_depth: usize,
    max_schema_size: usize,
    max_expanded_particles: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_schema_size: DEFAULT_MAX_SCHEMA_SIZE,
            max_expanded_particles: DEFAULT_MAX_EXPANDED_PARTICLES,
        }
    }
}

impl CatalogConfig {
    /// Setzt die maximale Anzahl Schritte pro Kettenlauf (mindestens 1).
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth.max(1);
        self
    }

    /// Setzt die maximale Größe eines Schema-Dokuments in Bytes.
    pub fn with_max_schema_size(mut self, bytes: usize) -> Self {
        self.max_schema_size = bytes;
        self
    }

    /// Setzt das Budget für expandierte Partikel (mindestens 1).
    ///
    /// Zählt jedes gelieferte Element-Partikel und jede expandierte
    /// `xs:group ref`. Wiederverwendete Groups vervielfachen sich sonst
    /// exponentiell mit der Schachtelungstiefe.
    pub fn with_max_expanded_particles(mut self, count: usize) -> Self {
        self.max_expanded_particles = count.max(1);
        self
    }

    /// Maximale Anzahl Schritte pro Kettenlauf.
    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }

    /// Maximale Größe eines Schema-Dokuments in Bytes.
    pub fn max_schema_size(&self) -> usize {
        self.max_schema_size
    }

    /// Budget für expandierte Partikel pro Inhaltsmodell.
    pub fn max_expanded_particles(&self) -> usize {
        self.max_expanded_particles
    }
}
