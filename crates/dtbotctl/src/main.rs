//! DTBOT Control - interactive chat surface for the DTBOT rule engine.
//!
//! Reads one line per turn, hands everything except the exit tokens to the
//! response resolver, and prints the reply verbatim.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use dtbot_common::{load_templates, ChatDb, Resolver};

const EXIT_TOKENS: &[&str] = &["hayr", "chiqish"];

#[derive(Parser)]
#[command(name = "dtbotctl")]
#[command(about = "DTBOT - rule-based Uzbek chat assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Database path (defaults to the user data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Sentence template JSON path
    #[arg(long)]
    templates: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .init();

    let cli = Cli::parse();

    // Store initialization failure is the one fatal error.
    let db_path = cli.db.unwrap_or_else(ChatDb::default_path);
    let db = ChatDb::open(&db_path)
        .with_context(|| format!("Ma'lumotlar bazasini ochib bo'lmadi: {}", db_path.display()))?;
    info!("Store ready at {}", db_path.display());

    let template_path = cli.templates.unwrap_or_else(default_template_path);
    let templates = load_templates(&template_path);

    let mut resolver = Resolver::new(&db, templates)?;
    print_banner();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Siz: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!("\nChatbot: Kiritish tugadi. Ma'lumotlar saqlandi.");
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if EXIT_TOKENS.contains(&input.to_lowercase().as_str()) {
            println!("Chatbot: Hayr, ko'rishguncha!");
            break;
        }

        let reply = resolver.resolve(input);
        println!("Chatbot: {reply}");
    }

    Ok(())
}

fn default_template_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("dtbot")
        .join("sentence_templates.json")
}

fn print_banner() {
    println!("Salom! Men o'zbek tilidagi DTBOTman! 😊 Savol bering yoki yangi so'zlarni o'rgating.");
    println!("Chiqish uchun 'hayr' yoki 'chiqish' deb yozing.");
    println!("Yangi so'zlarni o'rganish uchun: 'eslab qol' yoki 'o'rgan' deb yozing.");
    println!("Matn faylini o'rganish uchun: 'matn o'rgan: fayl_yo'li'");
    println!("Yangi javob o'rgatish uchun: 'o'rgat: savol : javob'");
}
