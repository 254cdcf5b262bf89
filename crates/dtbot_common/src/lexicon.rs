//! Lexicon store: word -> grammatical metadata.
//!
//! Every word the bot encounters ends up here, either through free-form
//! learning, the explicit learn directive, or bulk corpus ingestion. Keys
//! are lowercase and unique; entries are replaced on conflict and never
//! deleted. Enumeration order is insertion (rowid) order, which the fuzzy
//! corrector relies on for a reproducible tie-break.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::store::ChatDb;

/// Suffixes that mark a token as a verb when auto-deriving metadata.
pub const VERB_SUFFIXES: &[&str] = &["moq", "di", "yapti"];

/// Back vowels; a token containing any of these is classed as back-vowel.
pub const BACK_VOWELS: &[char] = &['a', 'o', 'u'];

/// Plural suffix appended to nouns.
pub const PLURAL_SUFFIX: &str = "lar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "ot")]
    Noun,
    #[serde(rename = "fel")]
    Verb,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "ot",
            PartOfSpeech::Verb => "fel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ot" => Some(PartOfSpeech::Noun),
            "fel" => Some(PartOfSpeech::Verb),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VowelClass {
    #[serde(rename = "qalin")]
    Back,
    #[serde(rename = "ingichka")]
    Front,
}

impl VowelClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            VowelClass::Back => "qalin",
            VowelClass::Front => "ingichka",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "qalin" => Some(VowelClass::Back),
            "ingichka" => Some(VowelClass::Front),
            _ => None,
        }
    }
}

/// Conjugation table: tense ("otgan", "hozirgi", "kelasi") -> person -> form.
pub type Conjugations = BTreeMap<String, BTreeMap<String, String>>;

/// One learned word with its grammatical metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub vowel_class: VowelClass,
    pub plural: String,
    pub conjugations: Option<Conjugations>,
}

impl LexiconEntry {
    /// Derive metadata for an auto-learned token.
    ///
    /// Part of speech comes from a fixed verb-suffix list, vowel class from
    /// the presence of a back vowel, and the plural is word + "lar" for
    /// nouns only. No conjugation table is derived.
    pub fn derive(token: &str) -> Self {
        let word = token.to_lowercase();
        let part_of_speech = if VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            PartOfSpeech::Verb
        } else {
            PartOfSpeech::Noun
        };
        let vowel_class = if word.chars().any(|c| BACK_VOWELS.contains(&c)) {
            VowelClass::Back
        } else {
            VowelClass::Front
        };
        let plural = match part_of_speech {
            PartOfSpeech::Noun => format!("{word}{PLURAL_SUFFIX}"),
            PartOfSpeech::Verb => word.clone(),
        };
        Self {
            word,
            part_of_speech,
            vowel_class,
            plural,
            conjugations: None,
        }
    }

    /// Stored conjugated form for the given tense and person, if any.
    pub fn conjugated(&self, tense: &str, person: &str) -> Option<&str> {
        self.conjugations
            .as_ref()
            .and_then(|forms| forms.get(tense))
            .and_then(|by_person| by_person.get(person))
            .map(String::as_str)
    }
}

/// SQLite-backed lexicon.
pub struct LexiconStore {
    conn: Arc<Mutex<Connection>>,
}

impl LexiconStore {
    pub fn new(db: &ChatDb) -> Self {
        Self { conn: db.conn() }
    }

    /// Insert or overwrite an entry. The word key stays at its original
    /// rowid on conflict, so enumeration order is stable across updates.
    pub fn upsert(&self, entry: &LexiconEntry) -> Result<()> {
        let forms_json = entry
            .conjugations
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO words (word, type, unli, kopluk, forms)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(word) DO UPDATE SET
                 type = excluded.type,
                 unli = excluded.unli,
                 kopluk = excluded.kopluk,
                 forms = excluded.forms",
            params![
                entry.word.to_lowercase(),
                entry.part_of_speech.as_str(),
                entry.vowel_class.as_str(),
                entry.plural,
                forms_json,
            ],
        )?;
        Ok(())
    }

    pub fn lookup(&self, word: &str) -> Result<Option<LexiconEntry>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<RawEntry> = conn
            .query_row(
                "SELECT word, type, unli, kopluk, forms FROM words WHERE word = ?1",
                [word.to_lowercase()],
                raw_entry,
            )
            .optional()?;
        row.map(RawEntry::into_entry).transpose()
    }

    /// All known words in insertion order.
    pub fn all_words(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT word FROM words ORDER BY rowid")?;
        let words = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(words)
    }

    /// Entries of one part of speech, in insertion order.
    pub fn words_by_part_of_speech(&self, tag: PartOfSpeech) -> Result<Vec<LexiconEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT word, type, unli, kopluk, forms FROM words
             WHERE type = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([tag.as_str()], raw_entry)?
            .collect::<rusqlite::Result<Vec<RawEntry>>>()?;
        rows.into_iter().map(RawEntry::into_entry).collect()
    }

    /// Learn an unknown token with derived metadata. Known words are left
    /// untouched. Returns whether the token was newly learned.
    pub fn learn_token(&self, token: &str) -> Result<bool> {
        let word = token.to_lowercase();
        if word.is_empty() || self.lookup(&word)?.is_some() {
            return Ok(false);
        }
        self.upsert(&LexiconEntry::derive(&word))?;
        Ok(true)
    }

    /// Number of learned words.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

struct RawEntry {
    word: String,
    pos: String,
    vowel: String,
    plural: String,
    forms: Option<String>,
}

fn raw_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        word: row.get(0)?,
        pos: row.get(1)?,
        vowel: row.get(2)?,
        plural: row.get(3)?,
        forms: row.get(4)?,
    })
}

impl RawEntry {
    fn into_entry(self) -> Result<LexiconEntry> {
        let part_of_speech = PartOfSpeech::parse(&self.pos)
            .ok_or_else(|| BotError::Internal(format!("unknown word type '{}'", self.pos)))?;
        let vowel_class = VowelClass::parse(&self.vowel)
            .ok_or_else(|| BotError::Internal(format!("unknown vowel class '{}'", self.vowel)))?;
        let conjugations = self
            .forms
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(LexiconEntry {
            word: self.word,
            part_of_speech,
            vowel_class,
            plural: self.plural,
            conjugations,
        })
    }
}
