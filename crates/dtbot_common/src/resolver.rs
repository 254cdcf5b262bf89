//! Response resolver: one deterministic decision per input line.
//!
//! A per-call decision tree evaluated in strict order, first match wins,
//! every branch terminal:
//!
//! 1. bulk corpus ingestion directive
//! 2. explicit vocabulary-learning directive
//! 3. explicit pattern-teaching directive
//! 4. exact pattern match (on the fuzzy-corrected input)
//! 5. context override
//! 6. free-form learning + sentence synthesis fallback
//!
//! Every branch appends exactly one conversation turn with the original,
//! uncorrected input. Nothing here may take down the interactive loop:
//! store failures inside a branch degrade to an apologetic reply.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::corrector::{Corrector, MorphAnalyzer};
use crate::error::Result;
use crate::history::ConversationLog;
use crate::ingest::ingest_corpus;
use crate::lexicon::LexiconStore;
use crate::patterns::PatternTable;
use crate::store::ChatDb;
use crate::synthesizer::synthesize;
use crate::templates::SentenceTemplate;
use crate::text::tokenize;

const INGEST_TRIGGER: &str = "matn o'rgan";
const TEACH_TRIGGER: &str = "o'rgat";
const LEARN_TRIGGERS: &[&str] = &["eslab qol", "o'rgan"];
const LEARN_TRIGGER_WORDS: &[&str] = &["eslab", "qol", "o'rgan"];
const CONTEXT_KEYWORD: &str = "nima";
const CONTEXT_REFERENCE: &str = "bot";

const LEARNED_REPLY: &str = "Yangi so'zlar eslab qolindi!";
const CONTEXT_REPLY: &str = "Men DTBOTman, sen bilan suhbatlashyapman! 😊";
const TEACH_USAGE_REPLY: &str =
    "Noto'g'ri format! Quyidagi formatdan foydalaning: o'rgat: savol : javob";
const DEGRADED_REPLY: &str = "Kechirasiz, hozir javob bera olmadim.";

pub struct Resolver {
    lexicon: LexiconStore,
    patterns: PatternTable,
    log: ConversationLog,
    corrector: Corrector,
    templates: Vec<SentenceTemplate>,
    rng: StdRng,
}

impl Resolver {
    /// Build a resolver over an open store, seeding the built-in pattern
    /// table (idempotent).
    pub fn new(db: &ChatDb, templates: Vec<SentenceTemplate>) -> Result<Self> {
        let patterns = PatternTable::new(db);
        patterns.seed()?;
        Ok(Self {
            lexicon: LexiconStore::new(db),
            patterns,
            log: ConversationLog::new(db),
            corrector: Corrector::new(),
            templates,
            rng: StdRng::from_entropy(),
        })
    }

    /// Plug in a morphological analyzer for the corrector.
    pub fn with_analyzer(mut self, analyzer: Box<dyn MorphAnalyzer>) -> Self {
        self.corrector = Corrector::with_analyzer(analyzer);
        self
    }

    pub fn lexicon(&self) -> &LexiconStore {
        &self.lexicon
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Resolve one input line to a reply, recording the turn.
    pub fn resolve(&mut self, input: &str) -> String {
        let reply = match self.dispatch(input) {
            Ok(reply) => reply,
            Err(err) => {
                warn!("Resolver branch failed: {err}");
                DEGRADED_REPLY.to_string()
            }
        };
        // The turn carries the original input, not the corrected one.
        if let Err(err) = self.log.append(input, &reply) {
            warn!("Failed to record conversation turn: {err}");
        }
        reply
    }

    fn dispatch(&mut self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();

        // 1. Bulk ingestion. The path comes from the raw line: running it
        // through the fuzzy corrector would rewrite path components into
        // lexicon words.
        if let Some((head, tail)) = trimmed.split_once(':') {
            if head.trim().to_lowercase() == INGEST_TRIGGER {
                return Ok(ingest_corpus(tail.trim(), &self.lexicon));
            }
        }

        // 2. Explicit vocabulary learning. Trigger words themselves are
        // not learned.
        if LEARN_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            for token in tokenize(&lowered) {
                if !LEARN_TRIGGER_WORDS.contains(&token.as_str()) {
                    self.lexicon.learn_token(&token)?;
                }
            }
            return Ok(LEARNED_REPLY.to_string());
        }

        // 3. Pattern teaching: o'rgat: savol : javob
        if let Some((head, rest)) = trimmed.split_once(':') {
            if head.trim().to_lowercase() == TEACH_TRIGGER {
                let Some((pattern, reply)) = rest.split_once(':') else {
                    return Ok(TEACH_USAGE_REPLY.to_string());
                };
                let pattern = pattern.trim().to_lowercase();
                let reply = reply.trim();
                if pattern.is_empty() || reply.is_empty() {
                    return Ok(TEACH_USAGE_REPLY.to_string());
                }
                self.patterns.teach(&pattern, reply)?;
                return Ok(format!("O'rgandim! '{pattern}' uchun javob: {reply}"));
            }
        }

        // 4. Exact pattern match over the corrected line.
        let corrected = self.corrector.correct_line(&lowered, &self.lexicon)?;
        if let Some(reply) = self.patterns.find_reply(&corrected)? {
            return Ok(reply);
        }

        // 5. Context override. Kept as the literal rule from the source:
        // "nima" in the input, "bot" in the previous turn's input.
        if corrected.contains(CONTEXT_KEYWORD) {
            if let Some(last) = self.log.last_turn()? {
                if last.user_input.to_lowercase().contains(CONTEXT_REFERENCE) {
                    return Ok(CONTEXT_REPLY.to_string());
                }
            }
        }

        // 6. Fallback: free-form learning always happens here, then the
        // learned tokens restrict synthesis.
        let tokens = tokenize(&corrected);
        for token in &tokens {
            self.lexicon.learn_token(token)?;
        }
        synthesize(&self.lexicon, &self.templates, &tokens, &mut self.rng)
    }
}
