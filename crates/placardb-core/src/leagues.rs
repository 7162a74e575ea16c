//! League catalog loaded from `config/leagues.yaml`.
//!
//! Each entry maps a league slug to its competition fixture page on the
//! source site. Leagues must be present here (and seeded into the database)
//! before a round can be ingested — unknown slugs are configuration errors,
//! not something we invent rows for.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeagueCatalogError {
    #[error("failed to read league catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse league catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown league slug: {0}")]
    UnknownLeague(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub slug: String,
    pub name: String,
    pub country: String,
    /// Competition fixture page, e.g. `https://www.ogol.com.br/competicao/brasileirao`.
    pub fixture_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueCatalog {
    pub leagues: Vec<LeagueEntry>,
}

impl LeagueCatalog {
    /// Load the catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueCatalogError::Io`] if the file cannot be read or
    /// [`LeagueCatalogError::Parse`] if it is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, LeagueCatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| LeagueCatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&raw).map_err(|e| LeagueCatalogError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Look up a league by slug.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueCatalogError::UnknownLeague`] when the slug is not in
    /// the catalog.
    pub fn get(&self, slug: &str) -> Result<&LeagueEntry, LeagueCatalogError> {
        self.leagues
            .iter()
            .find(|l| l.slug == slug)
            .ok_or_else(|| LeagueCatalogError::UnknownLeague(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_yaml() {
        let yaml = "
leagues:
  - slug: brasileirao
    name: \"Brasileirão Série A\"
    country: BR
    fixture_url: \"https://www.ogol.com.br/competicao/brasileirao\"
";
        let catalog: LeagueCatalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.leagues.len(), 1);
        let league = catalog.get("brasileirao").unwrap();
        assert_eq!(league.country, "BR");
        assert!(matches!(
            catalog.get("bundesliga"),
            Err(LeagueCatalogError::UnknownLeague(_))
        ));
    }
}
