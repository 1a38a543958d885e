use super::Filter;
use crate::schema::Database;

const NOT_LEGAL_KEYWORD: &str = "not for legal play";
const BANNED_TEXT: &str = "Added to the V:EKN banned list";

/// Excludes cards that are not legal for tournament play.
///
/// Uses the "not for legal play" keyword when the catalog has it, and falls
/// back to the banned-list text for catalogs imported before the keyword
/// existed.
pub fn make_illegal_filter(db: &Database) -> Filter {
    match Filter::keyword(db, NOT_LEGAL_KEYWORD) {
        Ok(keyword) => keyword.negate(),
        Err(_) => Filter::card_text(BANNED_TEXT).negate(),
    }
}

/// The LIKE pattern used to approximate a misspelled card name.
///
/// Articles and punctuation are dropped or wildcarded, vowels become single
/// character wildcards and word breaks become `%`, so "Rotschreck" still finds
/// "Rötschreck".
pub fn best_guess_pattern(name: &str) -> String {
    let mut text = format!(" {} ", name.to_lowercase())
        .replace(" the ", " ")
        .replace(',', " ");
    text = text
        .chars()
        .map(|ch| match ch {
            c if c.is_ascii_punctuation() => '_',
            'a' | 'e' | 'i' | 'o' | 'u' => '_',
            c => c,
        })
        .collect();
    let words: Vec<&str> = text.split_whitespace().collect();
    format!("%{}%", words.join("%"))
}

/// Legal cards whose name roughly matches `name`.
pub fn best_guess_filter(db: &Database, name: &str) -> Filter {
    Filter::and(vec![
        Filter::card_name_like(&best_guess_pattern(name)),
        make_illegal_filter(db),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::CardRecord;

    #[test]
    fn pattern_wildcards_vowels_and_punctuation() {
        assert_eq!(best_guess_pattern("The Ankara Citadel"), "%_nk_r_%c_t_d_l%");
        assert_eq!(best_guess_pattern("Abbot, The"), "%_bb_t%");
        assert_eq!(best_guess_pattern(".44 Magnum"), "%_44%m_gn_m%");
    }

    #[test]
    fn best_guess_finds_close_names() {
        let mut db = Database::new();
        let target = db.add_card(&CardRecord::new("Rötschreck")).unwrap();
        db.add_card(&CardRecord::new("Abbot")).unwrap();

        let found = best_guess_filter(&db, "Rotschreck").select_cards(&db).unwrap();
        // The wildcard standing in for "o" also matches "ö"
        assert_eq!(found, vec![target]);
    }

    #[test]
    fn illegal_cards_are_excluded() {
        let mut db = Database::new();
        let legal = db.add_card(&CardRecord::new("Abombwe")).unwrap();
        db.add_card(&CardRecord::new("Abombwe Storyline").keywords(&[NOT_LEGAL_KEYWORD]))
            .unwrap();

        let found = best_guess_filter(&db, "Abombwe").select_cards(&db).unwrap();
        assert_eq!(found, vec![legal]);
    }

    #[test]
    fn illegal_filter_falls_back_to_banned_text() {
        let mut db = Database::new();
        let legal = db.add_card(&CardRecord::new("Abebe")).unwrap();
        db.add_card(&CardRecord::new("Dramatic Upheaval").text(BANNED_TEXT))
            .unwrap();

        assert_eq!(make_illegal_filter(&db).select_cards(&db).unwrap(), vec![legal]);
    }
}
