mod api;
mod approval;
mod config;
mod profile;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use whiteboard::engine::{Action, NotifyLevel};
use whiteboard::import::{CandidateFile, DecodedImage, ImportError, ImportSource};
use whiteboard::persist::{PersistError, Session};
use whiteboard::shell::{EditorShell, SaveMode};
use whiteboard::viewport::Size;

use crate::api::{ApiClient, ApiError, UserProfile};
use crate::approval::ApprovalQueue;
use crate::config::{Config, ConfigError};
use crate::profile::HttpProfileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing token; run `godboard login` and set GODBOARD_TOKEN or pass --token")]
    MissingToken,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not flatten whiteboard: {0}")]
    Flatten(String),
    #[error("user {0} is not awaiting approval")]
    NotPending(String),
}

#[derive(Parser, Debug)]
#[command(name = "godboard", about = "Godparent platform client and headless whiteboard editor")]
struct Cli {
    #[arg(long, env = "GODBOARD_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "GODBOARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print the access token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GODBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check that the current token is still accepted.
    Verify,
    /// End the session bound to the current token.
    Logout,
    /// Compose and store a profile whiteboard.
    Whiteboard(WhiteboardCommand),
    /// Review users awaiting approval.
    Approvals(ApprovalsCommand),
}

#[derive(Args, Debug)]
struct WhiteboardCommand {
    #[command(subcommand)]
    command: WhiteboardSubcommand,
}

#[derive(Subcommand, Debug)]
enum WhiteboardSubcommand {
    Compose(ComposeArgs),
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[arg(long)]
    user_id: String,

    #[arg(long, default_value_t = false, help = "Ignore the stored whiteboard and start empty")]
    fresh: bool,

    #[arg(long, help = "Also write the flattened JPEG to this path")]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Do not store the result on the profile")]
    no_save: bool,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct ApprovalsCommand {
    #[command(subcommand)]
    command: ApprovalsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApprovalsSubcommand {
    List,
    /// Show one pending user with its neighbours in the queue.
    Show { user_id: String },
    Approve { user_id: String },
    Unapprove { user_id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let env = Config::from_env()?;
    let config = Config::new(&cli.api_url, cli.token.or(env.token), env.timeouts)?;
    let api = ApiClient::new(&config)?;

    match cli.command {
        Command::Login { email, password } => run_login(&api, &email, &password).await,
        Command::Verify => {
            api.authorized(require_token(&config)?).verify().await?;
            eprintln!("session valid for {}", api.base_url());
            Ok(())
        }
        Command::Logout => {
            api.authorized(require_token(&config)?).logout().await?;
            eprintln!("signed out");
            Ok(())
        }
        Command::Whiteboard(wb) => match wb.command {
            WhiteboardSubcommand::Compose(args) => run_compose(&api, &config, args).await,
        },
        Command::Approvals(approvals) => run_approvals(&api, &config, approvals.command).await,
    }
}

async fn run_login(api: &ApiClient, email: &str, password: &str) -> Result<(), CliError> {
    let login = api.login(email, password).await?;
    tracing::debug!(api = api.base_url(), "login accepted");
    tracing::info!(name = login.name.as_deref().unwrap_or(""), role = login.role.as_deref().unwrap_or(""), "signed in");
    println!("{}", login.access_token);
    Ok(())
}

fn require_token(config: &Config) -> Result<&str, CliError> {
    config.token.as_deref().ok_or(CliError::MissingToken)
}

// =============================================================================
// WHITEBOARD
// =============================================================================

async fn run_compose(api: &ApiClient, config: &Config, args: ComposeArgs) -> Result<(), CliError> {
    let session = Session::new(args.user_id, require_token(config)?);
    let store = HttpProfileStore::new(api.clone());

    let mut shell = if args.fresh {
        EditorShell::fresh(store, session, Size::canvas())
    } else {
        EditorShell::mount(store, session, Size::canvas()).await?
    };

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(read_candidate(path).await?);
    }
    let summary = shell.import_files_with(files, ImportSource::Picker, decode_on_blocking_pool).await;
    eprintln!("imported {} image(s), {} unreadable", summary.inserted, summary.failed);

    let mut preview = None;
    for action in shell.request_finalize() {
        match action {
            Action::PreviewReady(url) => preview = Some(url),
            Action::Notify { level: NotifyLevel::Error, message } => return Err(CliError::Flatten(message)),
            _ => {}
        }
    }
    let preview = preview.ok_or_else(|| CliError::Flatten("no preview produced".into()))?;

    if let Some(out) = &args.out {
        let (_, bytes) = whiteboard::import::parse_data_url(&preview)?;
        tokio::fs::write(out, bytes).await.map_err(|source| CliError::Io { path: out.clone(), source })?;
        eprintln!("wrote {}", out.display());
    }

    if args.no_save {
        shell.core_mut().dismiss_preview();
        return Ok(());
    }
    shell.save(SaveMode::Exit).await?;
    for notice in shell.take_notices() {
        if let Action::Notify { message, .. } = notice {
            eprintln!("{message}");
        }
    }
    Ok(())
}

async fn decode_on_blocking_pool(file: CandidateFile, source: ImportSource) -> Result<DecodedImage, ImportError> {
    let name = file.name.clone();
    tokio::task::spawn_blocking(move || whiteboard::import::decode(&file, source))
        .await
        .map_err(|e| ImportError::Task { name, reason: e.to_string() })?
}

async fn read_candidate(path: &Path) -> Result<CandidateFile, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    Ok(CandidateFile::new(name, media_type_for(path), bytes))
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// APPROVALS
// =============================================================================

async fn run_approvals(api: &ApiClient, config: &Config, command: ApprovalsSubcommand) -> Result<(), CliError> {
    let api = api.authorized(require_token(config)?);
    let mut queue = ApprovalQueue::new(api.pending_approvals().await?);

    let user_id = match command {
        ApprovalsSubcommand::List => {
            if queue.is_empty() {
                eprintln!("queue empty");
                return Ok(());
            }
            loop {
                if let (Some(pos), Some(user)) = (queue.position(), queue.current()) {
                    println!("{}\t{}\t{}\t{}", pos + 1, user.id, user.name, user.email);
                }
                if !queue.has_next() {
                    break;
                }
                queue.next();
            }
            eprintln!("{} pending", queue.len());
            return Ok(());
        }
        ApprovalsSubcommand::Show { user_id } => {
            select_pending(&mut queue, &user_id)?;
            if let Some(user) = queue.current() {
                print_user(user);
            }
            if queue.has_previous() {
                if let Some(prev) = queue.previous() {
                    eprintln!("previous: {} ({})", prev.name, prev.id);
                }
                queue.next();
            }
            if queue.has_next() {
                if let Some(next) = queue.next() {
                    eprintln!("next: {} ({})", next.name, next.id);
                }
            }
            return Ok(());
        }
        ApprovalsSubcommand::Approve { user_id } => {
            select_pending(&mut queue, &user_id)?;
            api.approve(&user_id).await?;
            user_id
        }
        ApprovalsSubcommand::Unapprove { user_id } => {
            select_pending(&mut queue, &user_id)?;
            api.unapprove(&user_id).await?;
            user_id
        }
    };

    queue.remove_current();
    tracing::info!(%user_id, remaining = queue.len(), "approval decision recorded");
    match queue.current() {
        Some(next) => eprintln!("next: {} ({}), {} remaining", next.name, next.id, queue.len()),
        None => eprintln!("queue empty"),
    }
    Ok(())
}

fn print_user(user: &UserProfile) {
    println!("id:     {}", user.id);
    println!("name:   {}", user.name);
    println!("email:  {}", user.email);
    println!("course: {}", user.course.as_deref().unwrap_or("-"));
    if let Some(year) = user.year_of_entry {
        println!("entry:  {year}");
    }
}

fn select_pending(queue: &mut ApprovalQueue<UserProfile>, user_id: &str) -> Result<(), CliError> {
    queue
        .select_where(|u| u.id == user_id)
        .map(drop)
        .ok_or_else(|| CliError::NotPending(user_id.to_owned()))
}
