//! Precis CLI - extractive webpage summaries
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use dialoguer::Select;
use precis::remote::RemoteSummarizer;
use precis::speech::{CommandEngine, SpeechEngine};
use precis::ui::controller::{Backend, Controller, SUMMARIZE_FAILED};
use precis::{export, logging, scraper, search, ui, Config, Playback, PlaybackState, Summarizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Parser)]
#[command(name = "precis")]
#[command(author, version, about = "Extractive webpage summaries you can listen to", long_about = None)]
struct Cli {
    /// Path to precis.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL, or a local HTML or text file
    ///
    /// Pages without any paragraph or heading text are reported as having no
    /// content.
    Summarise {
        /// URL or file to summarise
        source: String,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Print the summary as block markup
        #[arg(long)]
        html: bool,
        /// Word floor for the summary
        #[arg(long)]
        min_words: Option<usize>,
        /// Seed for reproducible sentence selection
        #[arg(long)]
        seed: Option<u64>,
        /// Use the remote summarizer service
        #[arg(long)]
        remote: bool,
        /// Highlight a search term in the output
        #[arg(long)]
        search: Option<String>,
        /// Write summary.txt (to the given directory, or the configured one)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
        /// Read the summary aloud
        #[arg(long)]
        speak: bool,
        /// Voice to read with
        #[arg(long)]
        voice: Option<String>,
        /// Pick the voice interactively
        #[arg(long, conflicts_with = "voice")]
        choose_voice: bool,
    },
    /// List available speech voices
    Voices,
    /// Open the interactive TUI
    Tui {
        /// URL or file to summarise on start
        source: Option<String>,
        /// Use the remote summarizer service
        #[arg(long)]
        remote: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match cli.command {
        Some(Commands::Summarise {
            source,
            raw,
            html,
            min_words,
            seed,
            remote,
            search: search_term,
            export: export_dir,
            speak,
            voice,
            choose_voice,
        }) => {
            logging::init_stderr(cli.verbose);
            let mut config = load_config(cli.config)?;
            if let Some(min_words) = min_words {
                config.summary.min_words = min_words;
            }
            if seed.is_some() {
                config.summary.seed = seed;
            }

            eprintln!("Fetching: {}", source);
            let content = scraper::load(&source).await?;
            let title = content
                .title
                .clone()
                .unwrap_or_else(|| "No title".to_string());

            if raw {
                // Just show raw extracted text
                println!("\n=== {} ===\n", title);
                println!("{}", content.text);
                println!("\n--- Extracted {} characters ---", content.text.len());
                return Ok(());
            }

            let summary = if remote {
                let remote = RemoteSummarizer::from_config(&config.remote)?;
                match remote.summarize(&content.text).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(error = %e, "remote summarizer failed");
                        anyhow::bail!(SUMMARIZE_FAILED);
                    }
                }
            } else {
                let mut rng = match config.summary.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Summarizer::new(config.summary.min_words).summarize(&content.text, &mut rng)
            };
            let summary = summary.with_title(content.title.clone());

            if summary.is_empty() {
                eprintln!("No complete sentences found in {}", source);
            }

            if html {
                println!("{}", summary.to_html());
            } else {
                println!("{}\n", format!("=== {} ===", title).bold());
                match &search_term {
                    Some(term) => {
                        let highlighted = search::highlight(&summary, term);
                        println!("{}", highlighted.to_terminal());
                        println!(
                            "\n{} match(es) for '{}'",
                            highlighted.match_count(),
                            highlighted.term
                        );
                    }
                    None => println!("{}", summary.plain_text()),
                }
            }

            if let Some(dir) = export_dir {
                let dir = dir.unwrap_or_else(|| config.export.dir.clone());
                let path = export::write_summary(&dir, &config.export.file_name, &summary)?;
                println!("\n💾 Saved to {}", path.display());
            }

            if speak && !summary.is_empty() {
                let mut engine = CommandEngine::from_config(&config.speech);
                let voice = if choose_voice {
                    choose(&mut engine)?
                } else {
                    voice.or(config.speech.voice.clone())
                };
                read_aloud(engine, &config, &summary.plain_text(), voice.as_deref()).await?;
            }
        }
        Some(Commands::Voices) => {
            logging::init_stderr(cli.verbose);
            let config = load_config(cli.config)?;
            let mut engine = CommandEngine::from_config(&config.speech);
            let voices = engine.voices();

            if voices.is_empty() {
                println!("No voices found (is '{}' installed?)", config.speech.program);
            } else {
                println!("Voices ({}):\n", voices.len());
                for voice in voices {
                    println!("  🔊 {} {}", voice.name.bold(), format!("({})", voice.lang).dimmed());
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "precis", &mut std::io::stdout());
        }
        Some(Commands::Tui { source, remote }) => {
            run_tui(cli.config, cli.verbose, source, remote).await?;
        }
        None => {
            // Default: Launch the TUI
            run_tui(cli.config, cli.verbose, None, false).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    })
}

async fn run_tui(
    config_path: Option<PathBuf>,
    verbose: bool,
    source: Option<String>,
    remote: bool,
) -> anyhow::Result<()> {
    logging::init_file(&Config::data_dir(), verbose);
    let config = load_config(config_path)?;

    let backend = if remote {
        Backend::remote(&config)?
    } else {
        Backend::local(&config)
    };
    let controller = Controller::new(backend, CommandEngine::from_config(&config.speech), &config);
    ui::run(controller, source).await?;
    Ok(())
}

/// Ask for a voice; `None` keeps the engine default
fn choose(engine: &mut CommandEngine) -> anyhow::Result<Option<String>> {
    let voices = engine.voices();
    if voices.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = voices.iter().map(|v| v.to_string()).collect();
    let index = Select::new()
        .with_prompt("Voice")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(voices.get(index).map(|v| v.name.clone()))
}

/// Speak `text` and wait until playback ends or Ctrl-C is pressed
async fn read_aloud(
    engine: CommandEngine,
    config: &Config,
    text: &str,
    voice: Option<&str>,
) -> anyhow::Result<()> {
    let mut playback = Playback::from_config(engine, &config.speech);
    playback.read_aloud(text, voice)?;
    println!("\n🔈 Reading aloud at {:.1}x (Ctrl-C to stop)", playback.rate());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                playback.stop()?;
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                if playback.poll() == PlaybackState::Idle {
                    break;
                }
            }
        }
    }
    Ok(())
}
