// Marginalia CLI - Transcript reader with threaded comments
// Comments live in a JSONL file in a GitHub repository

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use marginalia_core::dataset::{filter_split, load_transcripts, split_counts};
use marginalia_core::{
    parse_transcript, Comment, CommentStore, CommentThreads, GitHubContents, Message, StoreConfig,
    StoreError, Transcript,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match &cli.command {
        Command::Parse(args) => handle_parse(args)?,
        Command::Show(args) => handle_show(args, &cli.store).await?,
        Command::Comments { action } => match action {
            CommentsCommand::List { transcript } => {
                handle_list(transcript.as_deref(), &cli.store).await?
            }
            CommentsCommand::Add(args) => handle_add(args, &cli.store).await?,
        },
        Command::Splits { dataset } => handle_splits(dataset)?,
        Command::Status => handle_status(&cli.store),
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "marginalia",
    author,
    version,
    about = "Marginalia: read interview transcripts and comment on their messages",
    long_about = "Parse raw A:/User: transcripts into messages and keep threaded comments\non individual messages in a JSONL file stored in a GitHub repository."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    #[command(flatten)]
    store: StoreArgs,
    /// Log filter (e.g. "debug", "marginalia_core=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a raw transcript file ("-" for stdin) into messages
    Parse(ParseArgs),
    /// Show one transcript from a dataset export, with comments
    Show(ShowArgs),
    /// Read or add comments
    Comments {
        #[command(subcommand)]
        action: CommentsCommand,
    },
    /// Count transcripts per split in a dataset export
    Splits {
        #[arg(short, long)]
        dataset: PathBuf,
    },
    /// Show whether comments are enabled and where they are stored
    Status,
}

#[derive(Subcommand, Debug)]
enum CommentsCommand {
    /// List comment threads
    List {
        /// Only threads of this transcript
        #[arg(short, long)]
        transcript: Option<String>,
    },
    /// Add a comment to one message
    Add(AddArgs),
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// GitHub token with contents read/write access
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    /// Repository holding the comment log, as owner/name
    #[arg(long, env = "MARGINALIA_REPO", global = true)]
    repo: Option<String>,
    /// Path of the comment log inside the repository
    #[arg(long, env = "MARGINALIA_PATH", global = true)]
    log_path: Option<String>,
    /// Branch the comment log is read from and committed to
    #[arg(long, env = "MARGINALIA_BRANCH", global = true)]
    branch: Option<String>,
    /// GitHub API base URL
    #[arg(long, env = "MARGINALIA_API_BASE", global = true)]
    api_base: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl StoreArgs {
    fn config(&self) -> Result<Option<StoreConfig>> {
        let Some(ref repo) = self.repo else {
            return Ok(None);
        };

        let mut config = StoreConfig::from_slug(repo)?.with_token(self.token.clone());
        if let Some(ref path) = self.log_path {
            config = config.with_path(path.as_str());
        }
        if let Some(ref branch) = self.branch {
            config = config.with_branch(branch.as_str());
        }
        if let Some(ref api_base) = self.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(Some(config))
    }

    fn store(&self) -> Result<CommentStore<GitHubContents>> {
        let config = self
            .config()?
            .ok_or_else(|| eyre!("No comment repository configured (use --repo or MARGINALIA_REPO)"))?;
        CommentStore::github(config).context("Failed to set up comment store")
    }
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Transcript file, or "-" to read stdin
    file: PathBuf,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One JSON message per line
    Jsonl,
    /// "role: content" blocks
    Text,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Dataset export (JSONL of transcript_id, text, split)
    #[arg(short, long)]
    dataset: PathBuf,
    /// Transcript ID to show
    #[arg(long, conflicts_with = "index")]
    id: Option<String>,
    /// 1-based position within the (filtered) dataset
    #[arg(long)]
    index: Option<usize>,
    /// Only consider transcripts from this split
    #[arg(short, long)]
    split: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    transcript_id: String,
    /// 0-based index of the message within the parsed transcript
    message_index: usize,
    text: String,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
    }
}

fn handle_parse(args: &ParseArgs) -> Result<()> {
    let text = read_input(&args.file)?;
    let messages = parse_transcript(&text);
    tracing::debug!(bytes = text.len(), messages = messages.len(), "Parsed transcript");

    if messages.is_empty() {
        eprintln!("⚠ No A:/AI:/Assistant:/User: markers found");
    }

    match args.format {
        OutputFormat::Jsonl => {
            for message in &messages {
                println!("{}", serde_json::to_string(message)?);
            }
        }
        OutputFormat::Text => {
            for message in &messages {
                println!("{}: {}\n", message.role, message.content);
            }
        }
    }
    Ok(())
}

/// Print why comments are unavailable. Returns true if the error was handled.
fn report_disabled(err: &StoreError) -> bool {
    match err {
        StoreError::Auth(reason) => {
            eprintln!("⚠ Comments are disabled: {}", reason);
            eprintln!("  Set GITHUB_TOKEN (or --token) to enable them.");
            true
        }
        _ => false,
    }
}

async fn load_threads(store_args: &StoreArgs) -> Result<Option<CommentThreads>> {
    let store = store_args.store()?;
    if !store.has_credential() {
        eprintln!("⚠ Comments are disabled: no GitHub token configured (set GITHUB_TOKEN)");
        return Ok(None);
    }

    match store.load_comments().await {
        Ok(threads) => Ok(Some(threads)),
        Err(err) if report_disabled(&err) => Ok(None),
        Err(err) => Err(err).context("Failed to load comments"),
    }
}

fn pick_transcript<'a>(
    candidates: &[&'a Transcript],
    args: &ShowArgs,
) -> Result<(usize, &'a Transcript)> {
    if let Some(ref id) = args.id {
        return candidates
            .iter()
            .position(|t| &t.transcript_id == id)
            .map(|pos| (pos, candidates[pos]))
            .ok_or_else(|| eyre!("Transcript '{}' not found", id));
    }

    let position = args.index.unwrap_or(1);
    if position == 0 || position > candidates.len() {
        return Err(eyre!(
            "Index {} out of range (1-{})",
            position,
            candidates.len()
        ));
    }
    Ok((position - 1, candidates[position - 1]))
}

fn print_comment(comment: &Comment) {
    println!(
        "    💬 {} · {}",
        comment.timestamp.format("%Y-%m-%d %H:%M UTC"),
        comment.text
    );
}

fn print_message(index: usize, message: &Message) {
    println!("[{}] {}", index, message.role);
    for line in message.content.lines() {
        println!("    {}", line);
    }
}

async fn handle_show(args: &ShowArgs, store_args: &StoreArgs) -> Result<()> {
    let transcripts = load_transcripts(&args.dataset)?;
    let candidates = filter_split(&transcripts, args.split.as_deref());
    if candidates.is_empty() {
        return Err(eyre!("No transcripts in {}", args.dataset.display()));
    }

    let (position, transcript) = pick_transcript(&candidates, args)?;
    let messages = parse_transcript(&transcript.text);
    tracing::debug!(
        transcript = %transcript.transcript_id,
        messages = messages.len(),
        "Showing transcript"
    );

    let threads = if store_args.repo.is_some() {
        load_threads(store_args).await?
    } else {
        eprintln!("⚠ Comments are disabled: repository not configured (set MARGINALIA_REPO)");
        None
    };

    println!(
        "{} · {} · {} of {}\n",
        transcript.transcript_id,
        transcript.split.as_deref().unwrap_or("unsplit"),
        position + 1,
        candidates.len()
    );

    for (index, message) in messages.iter().enumerate() {
        print_message(index, message);
        if let Some(ref threads) = threads {
            for comment in threads.get(&transcript.transcript_id, index) {
                print_comment(comment);
            }
        }
        println!();
    }

    if messages.is_empty() {
        eprintln!("⚠ Transcript has no recognizable messages");
    }
    Ok(())
}

async fn handle_list(transcript: Option<&str>, store_args: &StoreArgs) -> Result<()> {
    let Some(threads) = load_threads(store_args).await? else {
        return Ok(());
    };

    let mut shown = 0;
    for (key, comments) in threads.iter() {
        if transcript.is_some_and(|id| id != key.transcript_id) {
            continue;
        }
        let suffix = if comments.len() == 1 { "" } else { "s" };
        println!("{} ({} comment{})", key, comments.len(), suffix);
        for comment in comments {
            print_comment(comment);
        }
        shown += 1;
    }

    if shown == 0 {
        println!("No comments yet.");
    }
    Ok(())
}

async fn handle_add(args: &AddArgs, store_args: &StoreArgs) -> Result<()> {
    let store = store_args.store()?;

    match store
        .save_comment(&args.transcript_id, args.message_index, &args.text)
        .await
    {
        Ok(comment) => {
            println!("✓ Comment added to {}", comment.key());
            println!("  Location: {}", store.backend().config().location());
            Ok(())
        }
        Err(StoreError::Conflict { path }) => {
            tracing::debug!(
                transcript = %args.transcript_id,
                index = args.message_index,
                "Save lost the race"
            );
            eprintln!("⚠ {} was changed by someone else while saving.", path);
            eprintln!("  Nothing was written. Reload and run the command again.");
            std::process::exit(2);
        }
        Err(err) if report_disabled(&err) => std::process::exit(1),
        Err(StoreError::EmptyComment) => Err(eyre!("Comment text is empty")),
        Err(err) if err.is_retryable() => {
            Err(err).context("Failed to save comment (temporary failure, safe to retry)")
        }
        Err(err) => Err(err).context("Failed to save comment"),
    }
}

fn handle_splits(dataset: &Path) -> Result<()> {
    let transcripts = load_transcripts(dataset)?;
    for (split, count) in split_counts(&transcripts) {
        println!("{:<12} {}", split, count);
    }
    println!("{:<12} {}", "total", transcripts.len());
    Ok(())
}

fn handle_status(store_args: &StoreArgs) {
    match store_args.config() {
        Ok(Some(config)) => {
            println!("Repository: {}", config.location());
            if config.has_token() {
                println!("✓ Comments enabled (token configured)");
            } else {
                println!("⚠ Comments disabled: token not configured (set GITHUB_TOKEN)");
            }
        }
        Ok(None) => {
            println!("⚠ Comments disabled: repository not configured (set MARGINALIA_REPO)");
        }
        Err(err) => {
            println!("⚠ Comments disabled: {}", err);
        }
    }
}
