//! Sentence template source.
//!
//! Templates are loaded once at startup from a JSON file of the form
//! `{ "sentence_templates": [ { "pattern": ["ot", "fel"] }, ... ] }` and
//! are immutable for the session. A missing or malformed file is a
//! non-fatal condition: the bot runs with an empty template set and the
//! synthesizer degrades to its "no templates" reply.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::lexicon::PartOfSpeech;

/// Ordered part-of-speech slot sequence for one generated sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceTemplate {
    #[serde(rename = "pattern")]
    pub slots: Vec<PartOfSpeech>,
}

#[derive(Deserialize)]
struct TemplateFile {
    #[serde(default)]
    sentence_templates: Vec<SentenceTemplate>,
}

/// Load templates, degrading to an empty set on any failure.
pub fn load_templates(path: &Path) -> Vec<SentenceTemplate> {
    match try_load(path) {
        Ok(templates) => {
            info!(
                "Loaded {} sentence templates from {}",
                templates.len(),
                path.display()
            );
            templates
        }
        Err(err) => {
            warn!(
                "Sentence templates unavailable ({}): {err}",
                path.display()
            );
            Vec::new()
        }
    }
}

fn try_load(path: &Path) -> crate::error::Result<Vec<SentenceTemplate>> {
    let text = fs::read_to_string(path)?;
    let file: TemplateFile = serde_json::from_str(&text)?;
    Ok(file.sentence_templates)
}
