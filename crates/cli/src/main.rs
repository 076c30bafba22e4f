use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atr_core::client::AskApiClient;
use atr_core::config::Settings;
use atr_core::domain::answer::FormattedAnswer;
use atr_core::domain::query::Tone;
use atr_core::format::{NEXT_MARKER, QUICK_MARKER, WATCH_MARKER};
use atr_core::history::backend::FileBackend;
use atr_core::history::store::HistoryStore;
use atr_core::session::{AskSession, Phase};

const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000";

const EXAMPLE_QUESTIONS: [&str; 4] = [
    "I’m under contract—what should I avoid doing before closing?",
    "How do I negotiate repairs without killing the deal?",
    "What’s the smartest offer strategy in a multiple-offer situation?",
    "Should I buy down my rate or keep cash for reserves?",
];

#[derive(Debug, Parser)]
#[command(name = "atr", about = "Ask the Realtor from your terminal")]
struct Args {
    /// Base URL of the ask API. Defaults to ATR_API_BASE, then localhost.
    #[arg(long)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask a question and print the formatted answer.
    Ask {
        question: String,

        /// Area the question is about.
        #[arg(long)]
        location: Option<String>,

        /// Answer style.
        #[arg(long, value_enum, default_value_t = ToneArg::Professional)]
        tone: ToneArg,

        /// Keep the full answer in saved history.
        #[arg(long)]
        save: bool,
    },

    /// List recent questions.
    Recent,

    /// List saved answers, or reprint one of them.
    Saved {
        /// 1-based index of the saved answer to show in full.
        #[arg(long)]
        show: Option<usize>,
    },

    /// A few starter questions.
    Examples,

    /// Empty one or both history lists.
    Clear {
        #[arg(long)]
        recent: bool,

        #[arg(long)]
        saved: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToneArg {
    Professional,
    PlainEnglish,
    InvestorLens,
}

impl From<ToneArg> for Tone {
    fn from(arg: ToneArg) -> Self {
        match arg {
            ToneArg::Professional => Tone::Professional,
            ToneArg::PlainEnglish => Tone::PlainEnglish,
            ToneArg::InvestorLens => Tone::InvestorLens,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let mut store = HistoryStore::new(FileBackend::new(data_dir(&settings)));
    if let Err(e) = store.load() {
        // Unreadable history is not fatal; the lists just start empty.
        tracing::warn!(error = %e, "history unavailable; starting empty");
    }

    match args.command {
        Command::Ask {
            question,
            location,
            tone,
            save,
        } => {
            let api_base = resolve_api_base(args.api_base.as_deref(), &settings);
            run_ask(&api_base, &mut store, question, location, tone.into(), save).await
        }
        Command::Recent => {
            if store.recent().is_empty() {
                println!("No recent questions.");
                return Ok(());
            }
            for (i, entry) in store.recent().iter().enumerate() {
                println!(
                    "{:>2}. [{}] ({}, {}) {}",
                    i + 1,
                    entry.asked_at.format("%Y-%m-%d %H:%M"),
                    entry.location,
                    entry.tone,
                    entry.question,
                );
            }
            Ok(())
        }
        Command::Saved { show } => match show {
            Some(index) => show_saved(&store, index),
            None => {
                if store.saved().is_empty() {
                    println!("No saved answers.");
                    return Ok(());
                }
                for (i, entry) in store.saved().iter().enumerate() {
                    println!(
                        "{:>2}. [{}] ({}) {}",
                        i + 1,
                        entry.saved_at.format("%Y-%m-%d %H:%M"),
                        entry.tone,
                        entry.question,
                    );
                }
                Ok(())
            }
        },
        Command::Examples => {
            for q in EXAMPLE_QUESTIONS {
                println!("- {q}");
            }
            Ok(())
        }
        Command::Clear { recent, saved } => {
            anyhow::ensure!(
                recent || saved,
                "nothing to clear; pass --recent and/or --saved"
            );
            if recent {
                let _ = store.clear_recent();
                println!("Recent questions cleared.");
            }
            if saved {
                let _ = store.clear_saved();
                println!("Saved answers cleared.");
            }
            Ok(())
        }
    }
}

async fn run_ask(
    api_base: &str,
    store: &mut HistoryStore<FileBackend>,
    question: String,
    location: Option<String>,
    tone: Tone,
    save: bool,
) -> anyhow::Result<()> {
    let mut session = AskSession::new();
    session.set_question(question);
    if let Some(location) = location {
        session.set_location(location);
    }
    session.set_tone(tone);

    let Some(entry) = session.begin_submit() else {
        anyhow::bail!("Please ask a more detailed question (at least 10 characters).");
    };

    // Recorded before the remote call, whatever its outcome. Persist
    // failures stay silent for the user.
    if let Err(e) = store.add_recent(entry) {
        tracing::warn!(error = %e, "failed to persist recent history");
    }

    let client = AskApiClient::new(api_base).context("failed to set up the ask client")?;
    match client.ask(&session.query()).await {
        Ok(answer) => session.resolve(answer),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            session.fail(format!("{e:#}"));
        }
    }

    if session.phase() == Phase::Failed {
        anyhow::bail!("{}", session.error());
    }

    print_answer(&session.sections());

    if save {
        match session.save_answer() {
            Some(saved) => {
                if let Err(e) = store.add_saved(saved) {
                    tracing::warn!(error = %e, "failed to persist saved answer");
                }
            }
            None => println!("(nothing to save: the reply was empty)"),
        }
    }

    Ok(())
}

fn show_saved(store: &HistoryStore<FileBackend>, index: usize) -> anyhow::Result<()> {
    let entry = index
        .checked_sub(1)
        .and_then(|i| store.saved().get(i))
        .with_context(|| format!("no saved answer #{index}"))?;

    let mut session = AskSession::new();
    session.load_saved(entry);

    println!("Q: {}", session.question());
    println!();
    print_answer(&session.sections());
    Ok(())
}

fn print_answer(sections: &FormattedAnswer) {
    if !sections.has_structured {
        println!("{}", sections.quick);
        return;
    }

    println!("{QUICK_MARKER}");
    println!("{}", sections.quick);
    println!();
    println!("{WATCH_MARKER}");
    println!("{}", sections.watch);
    println!();
    println!("{NEXT_MARKER}");
    println!("{}", sections.next);
}

fn resolve_api_base(flag: Option<&str>, settings: &Settings) -> String {
    flag.map(str::to_string)
        .or_else(|| settings.api_base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

fn data_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.data_dir {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("ask-the-realtor"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
