//! Catalog loading and cross-reference validation.
//!
//! The binary ships a bundled catalog so it runs out of the box; a custom
//! catalog file can be supplied on the command line. Either way the tables
//! are validated before a world is built from them so a witch can never
//! reference a unit type or spell that does not exist.

use std::{fs, path::Path};
use thiserror::Error;
use witch_battle_core::Catalog;

const BUNDLED_CATALOG: &str = include_str!("../assets/catalog.json");

/// Errors produced while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the catalog file from disk failed.
    #[error("failed to read catalog file '{path}'")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The catalog text was not valid catalog JSON.
    #[error("catalog is not valid JSON")]
    Parse(#[from] serde_json::Error),
    /// The catalog defines no witches to build bases from.
    #[error("catalog defines no witches")]
    NoWitches,
    /// A witch lists a unit type absent from the unit table.
    #[error("witch '{witch}' references unknown unit type '{unit}'")]
    UnknownUnitReference {
        /// Witch whose roster is broken.
        witch: String,
        /// Missing unit-type key.
        unit: String,
    },
    /// A witch lists a spell absent from the spell table.
    #[error("witch '{witch}' references unknown spell '{spell}'")]
    UnknownSpellReference {
        /// Witch whose spell list is broken.
        witch: String,
        /// Missing spell key.
        spell: String,
    },
}

/// Parses and validates the catalog bundled into the binary.
pub fn bundled() -> Result<Catalog, CatalogError> {
    parse(BUNDLED_CATALOG)
}

/// Loads, parses and validates a catalog from the provided path.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

/// Parses catalog JSON and validates its cross references.
pub fn parse(text: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_json::from_str(text)?;
    validate(&catalog)?;
    Ok(catalog)
}

fn validate(catalog: &Catalog) -> Result<(), CatalogError> {
    if catalog.witches.is_empty() {
        return Err(CatalogError::NoWitches);
    }
    for (witch, def) in &catalog.witches {
        for unit in &def.summonable_units {
            if !catalog.units.contains_key(unit) {
                return Err(CatalogError::UnknownUnitReference {
                    witch: witch.as_str().to_owned(),
                    unit: unit.as_str().to_owned(),
                });
            }
        }
        for spell in &def.spells {
            if !catalog.spells.contains_key(spell) {
                return Err(CatalogError::UnknownSpellReference {
                    witch: witch.as_str().to_owned(),
                    spell: spell.as_str().to_owned(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use witch_battle_core::{SpellId, UnitTypeId, WitchId};

    #[test]
    fn bundled_catalog_parses_and_validates() {
        let catalog = bundled().expect("bundled catalog");
        assert!(catalog.witches.contains_key(&WitchId::new("ember")));
        assert!(catalog.witches.contains_key(&WitchId::new("frost")));
        assert!(!catalog.affinities.is_empty());
    }

    #[test]
    fn bundled_witch_references_all_resolve() {
        let catalog = bundled().expect("bundled catalog");
        for def in catalog.witches.values() {
            for unit in &def.summonable_units {
                assert!(catalog.units.contains_key(unit));
            }
            for spell in &def.spells {
                assert!(catalog.spells.contains_key(spell));
            }
        }
    }

    #[test]
    fn rejects_a_witch_with_a_missing_unit() {
        let mut catalog = bundled().expect("bundled catalog");
        let witch = catalog
            .witches
            .get_mut(&WitchId::new("ember"))
            .expect("ember");
        witch.summonable_units.push(UnitTypeId::new("phantom"));
        let text = serde_json::to_string(&catalog).expect("serialize");
        assert!(matches!(
            parse(&text),
            Err(CatalogError::UnknownUnitReference { unit, .. }) if unit == "phantom"
        ));
    }

    #[test]
    fn rejects_a_witch_with_a_missing_spell() {
        let mut catalog = bundled().expect("bundled catalog");
        let witch = catalog
            .witches
            .get_mut(&WitchId::new("ember"))
            .expect("ember");
        witch.spells.push(SpellId::new("meteor"));
        let text = serde_json::to_string(&catalog).expect("serialize");
        assert!(matches!(
            parse(&text),
            Err(CatalogError::UnknownSpellReference { spell, .. }) if spell == "meteor"
        ));
    }

    #[test]
    fn rejects_an_empty_witch_table() {
        assert!(matches!(
            parse(r#"{"units":{},"spells":{},"witches":{},"affinities":{}}"#),
            Err(CatalogError::NoWitches)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse("{"), Err(CatalogError::Parse(_))));
    }
}
