//! Pattern/response table: canonical pattern -> fixed reply, with surface
//! variants routing to one canonical key.
//!
//! Matching is substring matching, not word-boundary matching: variant
//! "ish" matches input "ishlar qanday". That is deliberate - it recognizes
//! suffixed forms without any real morphology - and it carries a known
//! false-positive risk ("bu" would match inside "bugun"). Priority is seed
//! insertion order, then teaching order.

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::store::ChatDb;

/// Built-in seed table: (canonical pattern, surface variants, reply).
///
/// The source material defined this twice with overlapping keys; the rows
/// below are the merged result with last-write-wins on canonical keys.
/// Row order is the documented match priority.
const SEED: &[(&str, &[&str], &str)] = &[
    (
        "salom",
        &["salom", "assalomu alaykum"],
        "Salom! Qanday yordam bera olaman?",
    ),
    (
        "nima",
        &[
            "nima gap",
            "nima yangilik",
            "nima qilyapsan",
            "nima qilayapti bot",
        ],
        "Hozir shu yerda sen bilan suhbatlashyapman! 😊 Senda nima gap?",
    ),
    ("gap", &["nima gap"], "Hammasi zo'r! Senda nima gap?"),
    (
        "yaxshimisiz",
        &["yaxshimisiz"],
        "Yaxshi, rahmat! Siz yaxshimisiz?",
    ),
    (
        "rahmat",
        &["rahmat", "tashakkur"],
        "Arzimaydi, doim yordam beraman!",
    ),
    (
        "qalesan",
        &["qalesan", "qandaysan", "nima hol"],
        "Yaxshi, sen qandaysan?",
    ),
    (
        "isming",
        &["isming nima"],
        "Men DTBOTman! 😊 Isming nima?",
    ),
    (
        "qayerda",
        &["qayerdasan", "qayerdansan"],
        "Men bulutlarda, sen qayerdasan? 😄",
    ),
    (
        "yosh",
        &["yoshing nechada"],
        "Men abadiy yoshman! 😄 Senchi?",
    ),
    (
        "bugun",
        &["bugun nima kun"],
        "Bugun dushanba! Yana nima bilmoqchisan?",
    ),
    (
        "kun",
        &["bugun nima kun"],
        "Bugun dushanba! Yana nima bilmoqchisan?",
    ),
    (
        "vaqt",
        &["hozir soat necha"],
        "Hozir vaqtni bilish uchun telefoningga qarasang-chi! 😜",
    ),
    (
        "soat",
        &["hozir soat necha"],
        "Hozir vaqtni bilish uchun telefoningga qarasang-chi! 😜",
    ),
    (
        "ob",
        &["ob-havo qanday"],
        "Ob-havo haqida aniq bilmayman, lekin derazadan qarasang bo'ladi! 😊",
    ),
    (
        "havo",
        &["ob-havo qanday"],
        "Ob-havo haqida aniq bilmayman, lekin derazadan qarasang bo'ladi! 😊",
    ),
    (
        "qanday",
        &["qandaysan", "ob-havo qanday"],
        "Yaxshi, sen qandaysan?",
    ),
    (
        "shahar",
        &["qaysi shahar"],
        "Men Toshkentni yaxshi ko'raman, sen qaysi shahardan?",
    ),
    (
        "qaysi",
        &["qaysi shahar"],
        "Men Toshkentni yaxshi ko'raman, sen qaysi shahardan?",
    ),
    (
        "o'zbek",
        &["o'zbek tilida gaplashasanmi"],
        "Albatta, o'zbek tilida gaplashaman! Yana nima so'raymiz?",
    ),
    (
        "til",
        &["o'zbek tilida gaplashasanmi"],
        "Albatta, o'zbek tilida gaplashaman! Yana nima so'raymiz?",
    ),
    (
        "yordam",
        &["qanday yordam bera olasan"],
        "Savollarga javob beraman, yangi narsalarni o'rganaman! Nima so'ramoqchisan?",
    ),
    ("xayr", &["xayr", "xayrli kun"], "Xayr, yana ko'rishamiz!"),
    (
        "hayron",
        &["hayronman", "nima bu"],
        "Hayron bo'lishga hojat yo'q, hammasini tuzatamiz! 😊",
    ),
    (
        "yaxshi",
        &["yaxshisan", "yaxshi", "zo'r"],
        "Zo'r, yaxshi kayfiyatda bo'l! 😎",
    ),
];

pub struct PatternTable {
    conn: Arc<Mutex<Connection>>,
}

impl PatternTable {
    pub fn new(db: &ChatDb) -> Self {
        Self { conn: db.conn() }
    }

    /// Load the built-in seed table. Idempotent: replies upsert in place
    /// (the canonical key keeps its rowid, so match priority is stable
    /// across restarts) and variants insert-or-ignore.
    pub fn seed(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        for (canonical, variants, reply) in SEED {
            upsert_reply(&conn, canonical, reply)?;
            for variant in *variants {
                conn.execute(
                    "INSERT OR IGNORE INTO patterns (word, pattern) VALUES (?1, ?2)",
                    params![canonical, variant],
                )?;
            }
        }
        Ok(())
    }

    /// Reply for the first canonical pattern with a surface variant that is
    /// a substring of the input. `None` when nothing matches.
    pub fn find_reply(&self, normalized_input: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();

        let mut canon_stmt =
            conn.prepare("SELECT pattern, response FROM responses ORDER BY rowid")?;
        let canonicals = canon_stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut variant_stmt =
            conn.prepare("SELECT pattern FROM patterns WHERE word = ?1 ORDER BY rowid")?;
        for (canonical, reply) in canonicals {
            let variants = variant_stmt
                .query_map([&canonical], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            if variants.iter().any(|v| normalized_input.contains(v.as_str())) {
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    /// Teach a new pattern. The canonical pattern becomes its own single
    /// surface variant; re-teaching overwrites the reply without changing
    /// the pattern's match priority.
    pub fn teach(&self, canonical: &str, reply: &str) -> Result<()> {
        let canonical = canonical.to_lowercase();
        let conn = self.conn.lock().unwrap();
        upsert_reply(&conn, &canonical, reply)?;
        conn.execute(
            "INSERT OR IGNORE INTO patterns (word, pattern) VALUES (?1, ?1)",
            params![canonical],
        )?;
        Ok(())
    }
}

fn upsert_reply(conn: &Connection, canonical: &str, reply: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO responses (pattern, response) VALUES (?1, ?2)
         ON CONFLICT(pattern) DO UPDATE SET response = excluded.response",
        params![canonical, reply],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seeded() -> (tempfile::TempDir, PatternTable) {
        let dir = tempdir().unwrap();
        let db = ChatDb::open(&dir.path().join("test.db")).unwrap();
        let table = PatternTable::new(&db);
        table.seed().unwrap();
        (dir, table)
    }

    #[test]
    fn seeded_greeting_matches() {
        let (_dir, table) = seeded();
        let reply = table.find_reply("salom").unwrap().unwrap();
        assert_eq!(reply, "Salom! Qanday yordam bera olaman?");
    }

    #[test]
    fn substring_semantics_match_suffixed_forms() {
        let (_dir, table) = seeded();
        // "xayr" is a substring of "xayrli tun" via the "xayr" variant.
        let reply = table.find_reply("xayrli tun senga").unwrap().unwrap();
        assert_eq!(reply, "Xayr, yana ko'rishamiz!");
    }

    #[test]
    fn earlier_seed_rows_win() {
        let (_dir, table) = seeded();
        // "nima gap" is a variant of both "nima" and "gap"; "nima" was
        // seeded first and takes priority.
        let reply = table.find_reply("nima gap").unwrap().unwrap();
        assert!(reply.starts_with("Hozir shu yerda"));
    }

    #[test]
    fn no_match_returns_none() {
        let (_dir, table) = seeded();
        assert!(table.find_reply("qwerty").unwrap().is_none());
    }

    #[test]
    fn taught_pattern_round_trips_as_substring() {
        let (_dir, table) = seeded();
        table.teach("zanjabil choy", "Issiq ichimlik!").unwrap();
        let reply = table
            .find_reply("menga zanjabil choy yoqadi")
            .unwrap()
            .unwrap();
        assert_eq!(reply, "Issiq ichimlik!");
    }

    #[test]
    fn reteaching_overwrites_reply_in_place() {
        let (_dir, table) = seeded();
        table.teach("parol", "birinchi").unwrap();
        table.teach("parol", "ikkinchi").unwrap();
        assert_eq!(table.find_reply("parol").unwrap().unwrap(), "ikkinchi");
    }

    #[test]
    fn reseeding_keeps_priority_stable() {
        let (_dir, table) = seeded();
        table.seed().unwrap();
        let reply = table.find_reply("nima gap").unwrap().unwrap();
        assert!(reply.starts_with("Hozir shu yerda"));
    }
}
