//! Bulk corpus ingestion: learn vocabulary from a text file.
//!
//! All file errors surface as reply text, never as an error the caller has
//! to handle - the resolver hands the string straight back to the user.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use tracing::info;

use crate::lexicon::LexiconStore;
use crate::synthesizer::STOP_WORDS;
use crate::text::tokenize;

/// At most this many distinct words are learned per ingested file.
const MAX_LEARNED_WORDS: usize = 5000;

/// Learn the most frequent usable words from a text file.
///
/// Usable tokens are longer than one character, start with a letter, and
/// are not stop words. Invalid UTF-8 is replaced lossily. Equal-frequency
/// words rank alphabetically so the learned set is reproducible.
pub fn ingest_corpus(path: &str, lexicon: &LexiconStore) -> String {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => {
            return format!("Xato: {path} fayli bo'sh.");
        }
        Ok(_) => {}
        Err(err) => return file_error_reply(path, &err),
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return file_error_reply(path, &err),
    };
    let text = String::from_utf8_lossy(&bytes);

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in tokenize(&text) {
        let usable = token.chars().count() > 1
            && token.chars().next().is_some_and(char::is_alphabetic)
            && !STOP_WORDS.contains(&token.as_str());
        if usable {
            *counts.entry(token).or_default() += 1;
        }
    }

    if counts.is_empty() {
        return "Xato: Faylda foydali so'zlar topilmadi.".to_string();
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // Stable sort keeps ties in the BTreeMap's alphabetical order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut learned = 0usize;
    for (word, _) in ranked.into_iter().take(MAX_LEARNED_WORDS) {
        match lexicon.learn_token(&word) {
            Ok(true) => learned += 1,
            Ok(false) => {}
            Err(err) => {
                return format!("Xato: Matn faylini qayta ishlashda muammo: {err}");
            }
        }
    }

    info!("Ingested corpus {path}: {learned} new words");
    format!("Matn faylidagi so'zlar muvaffaqiyatli o'rganildi. Yangi so'zlar: {learned}")
}

fn file_error_reply(path: &str, err: &std::io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => {
            format!("Xato: {path} fayli topilmadi. Iltimos, yo'lni tekshiring.")
        }
        ErrorKind::PermissionDenied => {
            format!("Xato: {path} fayliga kirish huquqi yo'q.")
        }
        ErrorKind::InvalidData => {
            "Xato: Fayl UTF-8 kodlashida emas. Iltimos, faylni UTF-8 formatiga o'tkazing."
                .to_string()
        }
        _ => format!("Xato: Matn faylini qayta ishlashda muammo: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChatDb;
    use std::io::Write;
    use tempfile::tempdir;

    fn lexicon(dir: &tempfile::TempDir) -> LexiconStore {
        let db = ChatDb::open(&dir.path().join("test.db")).unwrap();
        LexiconStore::new(&db)
    }

    #[test]
    fn missing_file_is_reported_as_text() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        let reply = ingest_corpus("/nonexistent/kitob.txt", &lexicon);
        assert!(reply.contains("topilmadi"));
        assert_eq!(lexicon.len().unwrap(), 0);
    }

    #[test]
    fn empty_file_is_reported_as_text() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        let path = dir.path().join("empty.txt");
        fs::File::create(&path).unwrap();
        let reply = ingest_corpus(path.to_str().unwrap(), &lexicon);
        assert!(reply.contains("bo'sh"));
    }

    #[test]
    fn file_without_usable_tokens_is_reported() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        let path = dir.path().join("numbers.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "123 4 5 u a").unwrap();
        let reply = ingest_corpus(path.to_str().unwrap(), &lexicon);
        assert!(reply.contains("foydali so'zlar topilmadi"));
    }

    #[test]
    fn learns_frequent_words_and_reports_count() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        let path = dir.path().join("kitob.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "mushuk mushuk it va bu bilan").unwrap();

        let reply = ingest_corpus(path.to_str().unwrap(), &lexicon);
        assert!(reply.contains("Yangi so'zlar: 2"), "got: {reply}");
        assert!(lexicon.lookup("mushuk").unwrap().is_some());
        assert!(lexicon.lookup("it").unwrap().is_some());
        // Stop words are never learned.
        assert!(lexicon.lookup("bilan").unwrap().is_none());
    }

    #[test]
    fn already_known_words_do_not_count_as_new() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        lexicon.learn_token("mushuk").unwrap();

        let path = dir.path().join("kitob.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "mushuk it").unwrap();

        let reply = ingest_corpus(path.to_str().unwrap(), &lexicon);
        assert!(reply.contains("Yangi so'zlar: 1"), "got: {reply}");
    }

    #[test]
    fn lossy_decoding_still_learns_valid_words() {
        let dir = tempdir().unwrap();
        let lexicon = lexicon(&dir);
        let path = dir.path().join("mixed.txt");
        fs::write(&path, [b"mushuk ".as_slice(), &[0xff, 0xfe], b" it"].concat()).unwrap();

        let reply = ingest_corpus(path.to_str().unwrap(), &lexicon);
        assert!(reply.contains("muvaffaqiyatli"), "got: {reply}");
    }
}
