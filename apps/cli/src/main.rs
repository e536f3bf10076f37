use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use kmreview_core::{
    Action, KeyMomentPatch, KeyMomentStore, ReviewConfig, Session, SentenceRange,
    config::is_session_file, http_client,
};
use log::warn;

use crate::files::LocalFiles;

mod files;
mod render;

#[derive(Parser)]
#[command(name = "kmreview")]
#[command(about = "Review lecture transcripts and annotate their key moments")]
struct Cli {
    /// Session file (JSON Lines). Defaults to the newest .jsonl in the session directory.
    #[arg(short, long, global = true)]
    session: Option<PathBuf>,

    /// Write changes here instead of back to the session file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every item with its review progress
    List,
    /// Show one item's key moments
    Show {
        mid: String,
        /// Fetch the transcript to show timings and grouped text
        #[arg(short, long)]
        resolve: bool,
    },
    /// Apply one editing action to an item and save
    Apply {
        mid: String,
        #[command(subcommand)]
        action: EditCommand,
    },
    /// Validate a session: decode and re-encode it
    Check,
}

/// Moment numbers and SL bounds are 1-based, as in the session file.
#[derive(Subcommand)]
enum EditCommand {
    /// Edit a moment's fields; changing its range resolves overlaps
    Edit {
        moment: usize,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        concept: Option<String>,
        #[arg(long)]
        takeaway: Option<String>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
    },
    /// Insert a placeholder moment at a position, filling the free sentences there
    Insert { position: usize },
    Remove { moment: usize },
    /// Merge a moment with the one after it
    Merge { moment: usize },
    Review { moment: usize },
    /// Restore a moment as it was when the session was loaded. Moments made
    /// by inserting, merging or folding have nothing to restore.
    Reset { moment: usize },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn index_of(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .context("moment numbers start at 1")
}

async fn load_session(files: &LocalFiles, config: &ReviewConfig) -> Result<Session> {
    let session = Session::load(files, &config.session_dir)
        .await?
        .with_context(|| {
            format!(
                "no session file given and none found in {}",
                config.session_dir.display()
            )
        })?;
    if let Some(path) = session.path().filter(|p| !is_session_file(p)) {
        warn!("{} does not have a .jsonl extension", path.display());
    }
    Ok(session)
}

async fn resolve(session: &mut Session, config: &ReviewConfig, mid: &str) -> Result<()> {
    let client = http_client(config)?;
    let spinner = create_spinner(&format!("Loading transcript for {mid}..."));
    match session.resolve_sentences(&client, mid).await {
        Ok(video) => {
            spinner.finish_with_message(format!(
                "{} Transcript: {} sentences",
                style("✓").green().bold(),
                video.sentences.len()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

fn edit_patch(
    store: &KeyMomentStore,
    title: Option<String>,
    concept: Option<String>,
    key_takeaway: Option<String>,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<KeyMomentPatch> {
    let current = store
        .selected()
        .map(|m| m.sentence_range)
        .context("no such key moment")?;
    let sentence_range = match (start, end) {
        (None, None) => None,
        (start, end) => {
            let start = start.map(index_of).transpose()?.unwrap_or(current.start);
            let end = end.map(index_of).transpose()?.unwrap_or(current.end);
            if end < start {
                bail!("end SL {} is before start SL {}", end + 1, start + 1);
            }
            let count = store.sentence_count();
            if count > 0 && end >= count {
                bail!("end SL {} is past the last sentence, SL {count}", end + 1);
            }
            Some(SentenceRange::new(start, end))
        }
    };
    Ok(KeyMomentPatch {
        title,
        concept,
        key_takeaway,
        sentence_range,
    })
}

async fn apply(
    session: &mut Session,
    config: &ReviewConfig,
    mid: &str,
    command: EditCommand,
) -> Result<bool> {
    let needs_transcript = match &command {
        EditCommand::Insert { .. } => true,
        EditCommand::Edit { start, end, .. } => start.is_some() || end.is_some(),
        _ => false,
    };
    if needs_transcript {
        resolve(session, config, mid).await?;
    }
    let mut store = session.open_item(mid, config.overlap_policy)?;
    let len = store.key_moments().len();
    let valid = |number: usize| -> Result<usize> {
        let index = index_of(number)?;
        if index >= len {
            bail!("{mid} has {len} key moments, there is no moment {number}");
        }
        Ok(index)
    };

    match command {
        EditCommand::Edit {
            moment,
            title,
            concept,
            takeaway,
            start,
            end,
        } => {
            store.dispatch(Action::Select(valid(moment)?), session);
            let patch = edit_patch(&store, title, concept, takeaway, start, end)?;
            if patch.is_empty() {
                bail!("nothing to edit");
            }
            if !store.dispatch(Action::Edit(patch), session) {
                bail!("moment {moment} was not changed");
            }
        }
        EditCommand::Insert { position } => {
            let at = index_of(position)?.min(len);
            if !store.insert_placeholder(at, session) {
                println!(
                    "{} No free sentences at position {position}, nothing inserted",
                    style("!").yellow().bold()
                );
                return Ok(false);
            }
        }
        EditCommand::Remove { moment } => {
            store.dispatch(Action::Remove(valid(moment)?), session);
        }
        EditCommand::Merge { moment } => {
            let index = valid(moment)?;
            if index + 1 >= len {
                bail!("moment {moment} is the last one, nothing to merge with");
            }
            store.dispatch(Action::Merge(index), session);
        }
        EditCommand::Review { moment } => {
            store.dispatch(Action::MarkReviewed(valid(moment)?), session);
        }
        EditCommand::Reset { moment } => {
            store.dispatch(Action::Select(valid(moment)?), session);
            if !store.reset_selected(session) {
                bail!("moment {moment} was inserted, merged or folded after loading, nothing to reset");
            }
        }
    }

    let video = session
        .item(mid)
        .with_context(|| format!("no item {mid} in this session"))?;
    println!("{}", render::item_detail(video, store.cursor()));
    Ok(true)
}

/// With `--output` the changes go there and the loaded file is left alone.
async fn save(session: &mut Session, files: &LocalFiles) -> Result<Option<PathBuf>> {
    let saved = if files.has_output() {
        session.save_as(files, None).await?
    } else {
        session.save(files).await?
    };
    Ok(saved)
}

fn check(session: &Session) -> Result<()> {
    let encoded = session.encode().context("re-encoding failed")?;
    let again = Session::from_text(encoded, None).context("re-encoded text does not decode")?;
    for (mid, video) in session.items() {
        let round_tripped = again.item(mid).map(|v| &v.key_moments);
        if round_tripped != Some(&video.key_moments) {
            bail!("{mid}: key moments changed after a round-trip");
        }
    }
    println!(
        "{} {} items, {} skipped",
        style("✓").green().bold(),
        session.items().len(),
        session.skipped().len()
    );
    for skipped in session.skipped() {
        println!("  {} {}", style("!").yellow().bold(), skipped.error);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = ReviewConfig::from_env()?;
    let files = LocalFiles::new(cli.session, cli.output);

    let mut session = match load_session(&files, &config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "\n{}  {}\n",
        style("kmreview").cyan().bold(),
        style(session.path().map(|p| p.display().to_string()).unwrap_or_default()).dim()
    );

    match cli.command {
        Command::List => println!("{}", render::session_listing(&session)),
        Command::Show { mid, resolve: fetch } => {
            if fetch {
                resolve(&mut session, &config, &mid).await?;
            }
            let video = session
                .item(&mid)
                .with_context(|| format!("no item {mid} in this session"))?;
            println!("{}", render::item_detail(video, None));
            if fetch {
                println!("{}\n{}", render::rule(), render::transcript(video));
            }
        }
        Command::Apply { mid, action } => {
            if apply(&mut session, &config, &mid, action).await? {
                let saved = save(&mut session, &files).await?;
                if let Some(path) = saved {
                    println!(
                        "\n{} {}",
                        style("Saved:").dim(),
                        style(path.display()).cyan()
                    );
                }
            }
        }
        Command::Check => check(&session)?,
    }

    Ok(())
}
