//! Template-driven sentence synthesis.
//!
//! Picks a random template, then fills each part-of-speech slot with a
//! random lexicon entry, restricted to the caller's keyword filter when one
//! is given. All failure modes are non-fatal and surface as explanatory
//! reply text.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::lexicon::{LexiconEntry, LexiconStore, PartOfSpeech};
use crate::templates::SentenceTemplate;

/// Function words excluded from synthesis and corpus ingestion.
pub const STOP_WORDS: &[&str] = &[
    "va", "bu", "u", "bilan", "uchun", "da", "dan", "ga", "ni", "bir", "lekin",
];

const NO_TEMPLATES_REPLY: &str = "Gap shablonlari topilmadi.";

/// Build a sentence from a random template.
///
/// Returns explanatory text when no templates are loaded or when a slot has
/// no candidate word of the required part of speech; `Err` only on store
/// failure.
pub fn synthesize<R: Rng>(
    lexicon: &LexiconStore,
    templates: &[SentenceTemplate],
    keywords: &[String],
    rng: &mut R,
) -> Result<String> {
    let Some(template) = templates.choose(rng) else {
        return Ok(NO_TEMPLATES_REPLY.to_string());
    };

    let mut parts = Vec::with_capacity(template.slots.len());
    for slot in &template.slots {
        let entries = lexicon.words_by_part_of_speech(*slot)?;
        let candidates: Vec<&LexiconEntry> = entries
            .iter()
            .filter(|e| !STOP_WORDS.contains(&e.word.as_str()))
            .filter(|e| keywords.is_empty() || keywords.iter().any(|k| *k == e.word))
            .collect();

        let Some(entry) = candidates.choose(rng) else {
            return Ok(format!("{} turidagi so'z topilmadi.", slot.as_str()));
        };

        // Verbs prefer their stored present-tense 3s form.
        let surface = match slot {
            PartOfSpeech::Verb => entry
                .conjugated("hozirgi", "3s")
                .unwrap_or(&entry.word)
                .to_string(),
            PartOfSpeech::Noun => entry.word.clone(),
        };
        parts.push(surface);
    }

    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Conjugations;
    use crate::store::ChatDb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn lexicon() -> (tempfile::TempDir, LexiconStore) {
        let dir = tempdir().unwrap();
        let db = ChatDb::open(&dir.path().join("test.db")).unwrap();
        (dir, LexiconStore::new(&db))
    }

    fn template(slots: Vec<PartOfSpeech>) -> SentenceTemplate {
        SentenceTemplate { slots }
    }

    #[test]
    fn empty_template_set_reports_no_templates() {
        let (_dir, lexicon) = lexicon();
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &[], &[], &mut rng).unwrap();
        assert_eq!(reply, "Gap shablonlari topilmadi.");
    }

    #[test]
    fn missing_slot_candidates_name_the_tag() {
        let (_dir, lexicon) = lexicon();
        lexicon.learn_token("mushuk").unwrap(); // noun only
        let templates = [template(vec![PartOfSpeech::Verb])];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &[], &mut rng).unwrap();
        assert_eq!(reply, "fel turidagi so'z topilmadi.");
    }

    #[test]
    fn keyword_filter_restricts_candidates() {
        let (_dir, lexicon) = lexicon();
        lexicon.learn_token("mushuk").unwrap();
        lexicon.learn_token("it").unwrap();
        let templates = [template(vec![PartOfSpeech::Noun])];
        let keywords = vec!["it".to_string()];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &keywords, &mut rng).unwrap();
        assert_eq!(reply, "it");
    }

    #[test]
    fn keyword_filter_miss_names_the_tag() {
        let (_dir, lexicon) = lexicon();
        lexicon.learn_token("mushuk").unwrap();
        let templates = [template(vec![PartOfSpeech::Noun])];
        let keywords = vec!["fil".to_string()];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &keywords, &mut rng).unwrap();
        assert_eq!(reply, "ot turidagi so'z topilmadi.");
    }

    #[test]
    fn stop_words_are_never_sampled() {
        let (_dir, lexicon) = lexicon();
        lexicon.learn_token("va").unwrap();
        let templates = [template(vec![PartOfSpeech::Noun])];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &[], &mut rng).unwrap();
        assert_eq!(reply, "ot turidagi so'z topilmadi.");
    }

    #[test]
    fn verbs_use_present_third_singular_form() {
        let (_dir, lexicon) = lexicon();
        let mut forms = Conjugations::new();
        forms.insert(
            "hozirgi".to_string(),
            BTreeMap::from([("3s".to_string(), "yozyapti".to_string())]),
        );
        let mut entry = crate::lexicon::LexiconEntry::derive("yozmoq");
        entry.conjugations = Some(forms);
        lexicon.upsert(&entry).unwrap();

        let templates = [template(vec![PartOfSpeech::Verb])];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &[], &mut rng).unwrap();
        assert_eq!(reply, "yozyapti");
    }

    #[test]
    fn joins_slots_with_single_spaces() {
        let (_dir, lexicon) = lexicon();
        lexicon.learn_token("mushuk").unwrap();
        lexicon.learn_token("yozmoq").unwrap();
        let templates = [template(vec![PartOfSpeech::Noun, PartOfSpeech::Verb])];
        let mut rng = StdRng::seed_from_u64(0);
        let reply = synthesize(&lexicon, &templates, &[], &mut rng).unwrap();
        assert_eq!(reply, "mushuk yozmoq");
    }
}
