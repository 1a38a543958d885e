use crate::model::{CostType, DisciplineLevel, LookupKind, COST_X, GROUP_ANY};
use crate::schema::catalog::{CardRecord, CatalogFile, LookupRecord};
use crate::schema::Database;
use crate::store::InMemoryStore;

/// A small catalog covering crypt and library cards, imbued, variable costs,
/// multiple printings and an illegal card.
pub fn fixture_catalog() -> CatalogFile {
    CatalogFile {
        lookups: vec![
            LookupRecord {
                kind: LookupKind::Expansion,
                name: "Lords of the Night".to_string(),
                alias: Some("LotN".to_string()),
            },
            LookupRecord {
                kind: LookupKind::Discipline,
                name: "dom".to_string(),
                alias: Some("Dominate".to_string()),
            },
        ],
        cards: vec![
            CardRecord::new("Anson")
                .types(&["Vampire"])
                .clans(&["Toreador"])
                .sects(&["Camarilla"])
                .titles(&["Prince"])
                .group(1)
                .capacity(8)
                .discipline("aus", DisciplineLevel::Superior)
                .discipline("pre", DisciplineLevel::Superior)
                .rarity("Jyhad", "Rare")
                .artists(&["Richard Thomas"]),
            CardRecord::new("Hektor")
                .types(&["Vampire"])
                .clans(&["Ventrue"])
                .sects(&["Sabbat"])
                .group(2)
                .capacity(10)
                .discipline("dom", DisciplineLevel::Superior)
                .discipline("for", DisciplineLevel::Inferior)
                .rarity("Sabbat War", "Vampire"),
            CardRecord::new("Earl \"Shaka74\" Deams")
                .types(&["Imbued"])
                .creeds(&["Visionary"])
                .virtues(&["Vision"])
                .group(GROUP_ANY)
                .life(6)
                .rarity("Nights of Reckoning", "Uncommon"),
            CardRecord::new("Rötschreck")
                .types(&["Combat"])
                .text("Only usable when a vampire is burned by fire.")
                .rarity("Jyhad", "Uncommon"),
            CardRecord::new("Govern the Unaligned")
                .types(&["Action"])
                .text("{+1 stealth} action. Bleed with +1 bleed.")
                .discipline("dom", DisciplineLevel::Inferior)
                .rarity("Jyhad", "Common")
                .rarity("Lords of the Night", "PTo3"),
            CardRecord::new("Ancilla Empowerment")
                .types(&["Action"])
                .cost(COST_X, CostType::Pool)
                .rarity("Final Nights", "Rare"),
            CardRecord::new("Blood Doll")
                .types(&["Master"])
                .cost(0, CostType::Pool)
                .rarity("Jyhad", "Common"),
            CardRecord::new("Conditioning")
                .types(&["Action Modifier"])
                .cost(1, CostType::Blood)
                .text("+1 bleed.")
                .discipline("dom", DisciplineLevel::Inferior),
            CardRecord::new("Angel of Berlin")
                .types(&["Event"])
                .keywords(&["not for legal play"]),
        ],
    }
}

pub fn fixture_db() -> Database {
    Database::from_catalog(&fixture_catalog()).expect("fixture catalog loads")
}

/// An in-memory store preloaded with [`fixture_catalog`].
pub fn fixture_store() -> InMemoryStore {
    InMemoryStore::from_database(fixture_db())
}
