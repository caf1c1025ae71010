use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use ime_core::{
    DictionaryFacilitatorLruCache, DictionaryGroupFacilitator, EngineConfig, InputSession, Locale,
    SessionId, SuggestionList,
};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Interactive suggestion engine over the dictionaries in a directory.
#[derive(Parser, Debug)]
#[command(name = "ime_engine")]
struct Args {
    /// JSON engine configuration; defaults are used if it does not exist.
    #[arg(long, default_value = "ime_engine.json")]
    config: PathBuf,

    /// Overrides the configured dictionary directory.
    #[arg(long)]
    dictionary_dir: Option<PathBuf>,

    /// Overrides the configured locale, e.g. en_US.
    #[arg(long)]
    locale: Option<String>,
}

fn main() -> ime_core::Result<()> {
    // Warnings only, so log lines do not tear up the screen.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = EngineConfig::load_or_default(&args.config)?;
    if let Some(dir) = args.dictionary_dir {
        config.dictionary_dir = dir;
    }
    if let Some(locale) = args.locale {
        config.locale = Locale::new(&locale);
    }

    let cache = Arc::new(
        DictionaryFacilitatorLruCache::new(
            DictionaryGroupFacilitator::from_config(&config),
            config.dictionary_name_prefix.clone(),
        )
        .with_wait_policy(config.wait_policy()),
    );
    let mut session = InputSession::new(Arc::clone(&cache), &config, SessionId(0))?;

    let mut status = String::new();
    loop {
        print_ui(&session, &status)?;
        status.clear();

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim_end_matches(['\r', '\n']);

        match cmd {
            "exit" => break,
            "" => {
                if session.is_composing() {
                    let last = session.commit_on_separator(" ");
                    status = format!("Committed '{}'", last.committed_word());
                }
            }
            "<" => session.backspace(),
            "!revert" => {
                status = if session.revert_commit() {
                    "Auto-correction cancelled".to_string()
                } else {
                    "Nothing to revert".to_string()
                };
            }
            s if s.starts_with("!locale ") => {
                let locale = Locale::new(&s["!locale ".len()..]);
                status = format!("Locale {locale}");
                session.set_locale(locale);
            }
            s if s.starts_with("!contacts ") => match parse_switch(&s["!contacts ".len()..]) {
                Some(on) => {
                    session.set_use_contacts_dictionary(on);
                    status = format!("Contacts dictionary {}", if on { "on" } else { "off" });
                }
                None => status = format!("Bad command '{s}', use '!contacts on' or '!contacts off'"),
            },
            s if s.starts_with(':') && s.len() > 1 => match s[1..].parse::<usize>() {
                Ok(n) if n > 0 => match session.commit_suggestion(n - 1) {
                    Some(last) => status = format!("Committed '{}'", last.committed_word()),
                    None => status = format!("No suggestion :{n}"),
                },
                _ => status = format!("Bad selection '{s}'"),
            },
            s => {
                for (i, c) in s.chars().enumerate() {
                    session.add_code_point(c, i as i32, 0);
                }
            }
        }
    }

    cache.close_dictionaries();
    println!("\nText: {}", session.text());
    Ok(())
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.trim() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn print_ui(session: &InputSession<DictionaryGroupFacilitator>, status: &str) -> std::io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Suggestion engine".bold());
    println!("---------------------------------------------------------------");
    println!("Type letters and press [Enter] to commit, ':N' to pick, '<' to delete.");
    println!("'!revert', '!locale xx_YY', '!contacts on|off', 'exit' to quit.\n");

    println!("Locale:   {}", session.locale());
    println!("Context:  {}", session.ngram_context().extract_prev_words_context());
    println!("Text:     {}", session.text());
    println!("Pre-edit: [{}]", session.typed_word().cyan());
    if !status.is_empty() {
        println!("{}", status.yellow());
    }

    let suggestions = session.suggestions();
    if !suggestions.is_empty() {
        println!("\nSuggestions:");
        for (i, info) in suggestions.infos().iter().enumerate() {
            let marker = if suggestions.will_auto_correct() && i == 1 { "*" } else { " " };
            println!(" {marker}:{}: {} ({:?}, score {})", i + 1, info.word(), info.kind(), info.score());
        }
    } else if !session.is_composing() {
        let punctuation = session.punctuation_suggestions();
        let labels: Vec<String> = (0..punctuation.len())
            .filter_map(|i| punctuation.label(i).map(|l| format!(":{} {l}", i + 1)))
            .collect();
        println!("\nPunctuation: {}", labels.join("  "));
    } else {
        println!("\nNo suggestions found.");
    }
    print!("\n> ");
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::parse_switch;

    #[test]
    fn switch_accepts_only_on_and_off() {
        assert_eq!(parse_switch("on"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch(" on "), Some(true));
        assert_eq!(parse_switch("moon"), None);
        assert_eq!(parse_switch("button"), None);
        assert_eq!(parse_switch(""), None);
    }
}
