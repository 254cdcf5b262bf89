//! DTBOT common library - rule-based Uzbek chat over a learned lexicon.
//!
//! The core is the response-resolution pipeline in [`resolver`]: per-token
//! fuzzy correction against the persistent [`lexicon`], exact lookup in the
//! [`patterns`] table, a narrow context override over the [`history`] log,
//! and template-driven [`synthesizer`] fallback. All state lives in one
//! SQLite database opened through [`store::ChatDb`].

pub mod corrector;
pub mod error;
pub mod history;
pub mod ingest;
pub mod lexicon;
pub mod patterns;
pub mod resolver;
pub mod store;
pub mod synthesizer;
pub mod templates;
pub mod text;

pub use corrector::{edit_distance, Corrector, MorphAnalyzer, MAX_EDIT_DISTANCE};
pub use error::{BotError, Result};
pub use history::{ConversationLog, ConversationTurn};
pub use ingest::ingest_corpus;
pub use lexicon::{Conjugations, LexiconEntry, LexiconStore, PartOfSpeech, VowelClass};
pub use patterns::PatternTable;
pub use resolver::Resolver;
pub use store::ChatDb;
pub use synthesizer::{synthesize, STOP_WORDS};
pub use templates::{load_templates, SentenceTemplate};
pub use text::tokenize;
