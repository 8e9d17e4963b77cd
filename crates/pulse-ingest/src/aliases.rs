//! Alias registry — maps normalized words (`nix`, `nixcoin`) to canonical
//! token labels (`NIX`).
//!
//! The registry is an external collaborator. Lookup failures are reported
//! as errors here and degraded to "no alias" by the extractor.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A resolved alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAlias {
    pub label: String,
}

/// Word → label lookup.
pub trait AliasRegistry: Send + Sync {
    /// Resolve a normalized word. `Ok(None)` means the word is not an alias.
    fn lookup(&self, word: &str) -> pulse_core::Result<Option<TokenAlias>>;
}

/// In-memory alias table.
#[derive(Debug, Clone, Default)]
pub struct StaticAliases {
    table: HashMap<String, String>,
}

impl StaticAliases {
    /// Build from `(alias, label)` pairs. Aliases are normalized, labels upper-cased.
    pub fn new<I, A, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, L)>,
        A: AsRef<str>,
        L: AsRef<str>,
    {
        let table = pairs
            .into_iter()
            .map(|(alias, label)| {
                (
                    crate::normalize_text(alias.as_ref()),
                    label.as_ref().trim().to_uppercase(),
                )
            })
            .filter(|(alias, label)| !alias.is_empty() && !label.is_empty())
            .collect();
        Self { table }
    }

    /// Load a JSON object `{ "alias": "LABEL" }`. A missing or unreadable
    /// file yields an empty table.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => {
                info!("No alias table at {}, starting without aliases", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => {
                let aliases = Self::new(map);
                info!("Loaded {} token aliases", aliases.len());
                aliases
            }
            Err(e) => {
                warn!("Ignoring unreadable alias table {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl AliasRegistry for StaticAliases {
    fn lookup(&self, word: &str) -> pulse_core::Result<Option<TokenAlias>> {
        Ok(self.table.get(word).map(|label| TokenAlias {
            label: label.clone(),
        }))
    }
}
