#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::TaskListError;
use crate::logging;
use crate::output::table::Table;
use crate::output::{format_timestamp, truncate};
use crate::task::manager::{AddOutcome, EditOutcome, TaskListManager};
use crate::task::model::{FilterMode, Priority, Task};
use crate::task::storage::{FileStore, KeyValueStore as _};
use crate::tui;

#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about = "Persistent to-do list manager")]
pub struct Cli {
    /// Store key holding the list (overrides store.key)
    #[arg(long = "key", global = true, value_name = "KEY")]
    pub store_key: Option<String>,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Add(AddArgs),
    Edit(EditArgs),
    /// Toggle a task between done and active
    #[command(alias = "toggle")]
    Done(PatternArgs),
    Priority(PriorityArgs),
    #[command(alias = "rm")]
    Remove(PatternArgs),
    Clear(ClearArgs),
    List(ListArgs),
    Show(PatternArgs),
    Stats(StatsArgs),
    Import(ImportArgs),
    /// List keys present in the store directory
    Keys,
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Optional description
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
    /// Priority (low, normal, high); needs list.supports_priority
    #[arg(short = 'p', long = "priority")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Task id, id prefix or title
    pub pattern: String,
    /// New title; an empty title follows list.empty_edit
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,
    /// New description
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,
}

#[derive(Debug, Parser)]
pub struct PatternArgs {
    /// Task id, id prefix or title
    pub pattern: String,
}

#[derive(Debug, Parser)]
pub struct PriorityArgs {
    /// Task id, id prefix or title
    pub pattern: String,
    /// low, normal or high
    pub level: Priority,
}

#[derive(Debug, Parser)]
pub struct ClearArgs {
    /// Remove every task, not only completed ones
    #[arg(long = "all")]
    pub all: bool,
    /// Skip the confirmation prompt for --all
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Parser)]
pub struct ListArgs {
    /// Filter by state (all, active, completed); defaults to ui.default_filter
    #[arg(short = 'f', long = "filter")]
    pub filter: Option<FilterMode>,
    /// Case-insensitive search over title and description
    #[arg(short = 's', long = "search", default_value = "")]
    pub search: String,
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
    /// Redraw every interval until Ctrl+C
    #[arg(short = 'w', long = "watch")]
    pub watch: bool,
    /// Refresh interval in seconds for watch mode
    #[arg(short = 'i', long = "interval", default_value_t = 2)]
    pub interval_seconds: u64,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// YAML or JSON file holding a list of tasks
    pub file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => {
            let interactive = tui::is_tty();
            let ctx = open(cli.store_key, interactive).await?;
            if interactive {
                tui::app::run(&ctx.cfg, ctx.manager())?;
                return Ok(ExitCode::SUCCESS);
            }
            cmd_list(&ctx, ListArgs::default()).await
        }
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "tasklist", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => {
            logging::init(&config::LogConfig::default().level);
            cmd_config(args)
        }
        Some(Commands::Version) => Ok(cmd_version()),
        Some(Commands::Add(args)) => cmd_add(&open(cli.store_key, false).await?, args),
        Some(Commands::Edit(args)) => cmd_edit(&open(cli.store_key, false).await?, args),
        Some(Commands::Done(args)) => cmd_done(&open(cli.store_key, false).await?, &args),
        Some(Commands::Priority(args)) => cmd_priority(&open(cli.store_key, false).await?, &args),
        Some(Commands::Remove(args)) => cmd_remove(&open(cli.store_key, false).await?, &args),
        Some(Commands::Clear(args)) => cmd_clear(&open(cli.store_key, false).await?, &args),
        Some(Commands::List(args)) => cmd_list(&open(cli.store_key, false).await?, args).await,
        Some(Commands::Show(args)) => cmd_show(&open(cli.store_key, false).await?, &args),
        Some(Commands::Stats(args)) => cmd_stats(&open(cli.store_key, false).await?, &args),
        Some(Commands::Import(args)) => cmd_import(&open(cli.store_key, false).await?, &args),
        Some(Commands::Keys) => cmd_keys(&open(cli.store_key, false).await?),
    }
}

/// Loads config, installs logging and resolves the store.
async fn open(key_override: Option<String>, interactive: bool) -> anyhow::Result<Ctx> {
    let cfg = load_cfg().await?;
    // Log lines would corrupt the alternate screen.
    logging::init(if interactive { "off" } else { &cfg.log.level });
    Ctx::new(cfg, key_override)
}

async fn load_cfg() -> anyhow::Result<Config> {
    let cfg = tokio::task::spawn_blocking(|| -> anyhow::Result<Config> {
        let (cfg, _paths) = config::load()?;
        Ok(cfg)
    })
    .await??;
    Ok(cfg)
}

/// Resolved configuration plus the store location every command works against.
struct Ctx {
    cfg: Config,
    store_dir: PathBuf,
    key: String,
}

impl Ctx {
    fn new(cfg: Config, key_override: Option<String>) -> anyhow::Result<Self> {
        let store_dir = config::expand_path(&cfg.store.dir)?;
        let key = match key_override {
            Some(k) if k.trim().is_empty() => {
                return Err(TaskListError::InvalidStoreKey {
                    key: k,
                    msg: "must not be empty".to_owned(),
                }
                .into());
            }
            Some(k) => k,
            None => cfg.store.key.clone(),
        };
        Ok(Self {
            cfg,
            store_dir,
            key,
        })
    }

    fn store(&self) -> FileStore {
        FileStore::new(self.store_dir.clone())
    }

    fn manager(&self) -> TaskListManager<FileStore> {
        TaskListManager::load(self.store(), self.key.clone(), self.cfg.list.options())
    }
}

/// Surfaces a failed write; the manager itself only logs it.
fn ensure_saved(manager: &TaskListManager<FileStore>) -> anyhow::Result<()> {
    if let Some(err) = manager.last_persist_error() {
        anyhow::bail!(
            "failed to save tasks to {}: {err}",
            manager.store().dir().display()
        );
    }
    Ok(())
}

fn cmd_add(ctx: &Ctx, args: AddArgs) -> anyhow::Result<ExitCode> {
    let mut manager = ctx.manager();
    if args.priority.is_some() && !manager.options().supports_priority {
        eprintln!("Note: priorities are disabled (list.supports_priority); ignoring --priority");
    }

    match manager.add_with_priority(
        &args.title,
        &args.description,
        args.priority.unwrap_or_default(),
    ) {
        AddOutcome::Added { id } => {
            ensure_saved(&manager)?;
            println!("{id}");
            Ok(ExitCode::SUCCESS)
        }
        AddOutcome::Ignored => {
            eprintln!("Nothing added: title is empty");
            Ok(ExitCode::SUCCESS)
        }
        AddOutcome::Duplicate { title } => {
            eprintln!("Task '{title}' already exists");
            Ok(ExitCode::from(1))
        }
    }
}

fn cmd_edit(ctx: &Ctx, args: EditArgs) -> anyhow::Result<ExitCode> {
    if args.title.is_none() && args.description.is_none() {
        anyhow::bail!("nothing to change: pass --title and/or --description");
    }

    let mut manager = ctx.manager();
    let task = manager.find(&args.pattern)?.clone();
    let title = args.title.unwrap_or_else(|| task.title.clone());
    let description = args
        .description
        .unwrap_or_else(|| task.description.clone());

    match manager.edit(&task.id, &title, &description) {
        EditOutcome::Updated => {
            ensure_saved(&manager)?;
            println!("Updated {}", task.id);
            Ok(ExitCode::SUCCESS)
        }
        EditOutcome::Removed => {
            ensure_saved(&manager)?;
            println!("Removed {} (empty title)", task.id);
            Ok(ExitCode::SUCCESS)
        }
        EditOutcome::Ignored => {
            eprintln!("Nothing changed: title is empty");
            Ok(ExitCode::SUCCESS)
        }
        EditOutcome::Duplicate { title } => {
            eprintln!("Task '{title}' already exists");
            Ok(ExitCode::from(1))
        }
        EditOutcome::NotFound => Err(TaskListError::TaskNotFound(args.pattern).into()),
    }
}

fn cmd_done(ctx: &Ctx, args: &PatternArgs) -> anyhow::Result<ExitCode> {
    let mut manager = ctx.manager();
    let id = manager.find(&args.pattern)?.id.clone();
    manager.toggle_done(&id);
    ensure_saved(&manager)?;

    let state = match manager.get(&id) {
        Some(t) if t.done => "done",
        _ => "active",
    };
    println!("{id} marked {state}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_priority(ctx: &Ctx, args: &PriorityArgs) -> anyhow::Result<ExitCode> {
    let mut manager = ctx.manager();
    if !manager.options().supports_priority {
        anyhow::bail!(
            "priorities are disabled - enable them with 'tasklist config set list.supports_priority true'"
        );
    }
    let id = manager.find(&args.pattern)?.id.clone();
    manager.set_priority(&id, args.level);
    ensure_saved(&manager)?;
    println!("{id} priority {}", args.level);
    Ok(ExitCode::SUCCESS)
}

fn cmd_remove(ctx: &Ctx, args: &PatternArgs) -> anyhow::Result<ExitCode> {
    let mut manager = ctx.manager();
    let task = manager.find(&args.pattern)?.clone();
    manager.remove(&task.id);
    ensure_saved(&manager)?;
    println!("Removed {} ({})", task.id, truncate(&task.title, 60));
    Ok(ExitCode::SUCCESS)
}

fn cmd_clear(ctx: &Ctx, args: &ClearArgs) -> anyhow::Result<ExitCode> {
    let mut manager = ctx.manager();

    if !args.all {
        let removed = manager.clear_completed();
        ensure_saved(&manager)?;
        println!("Cleared {removed} completed task(s)");
        return Ok(ExitCode::SUCCESS);
    }

    if manager.is_empty() {
        println!("No tasks to clear.");
        return Ok(ExitCode::SUCCESS);
    }
    if !args.yes {
        if !tui::is_tty() {
            anyhow::bail!("refusing to delete every task without --yes");
        }
        if !confirm(&format!(
            "This will delete all {} task(s) under '{}'.",
            manager.len(),
            manager.key()
        ))? {
            return Err(TaskListError::Cancelled.into());
        }
    }

    let removed = manager.clear_all();
    ensure_saved(&manager)?;
    println!("Deleted {removed} task(s)");
    Ok(ExitCode::SUCCESS)
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    println!("{message}");
    print!("Are you sure? (y/N): ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input)?;
    let resp = input.trim().to_lowercase();
    Ok(resp == "y" || resp == "yes")
}

async fn cmd_list(ctx: &Ctx, args: ListArgs) -> anyhow::Result<ExitCode> {
    let filter = args.filter.unwrap_or_else(|| ctx.cfg.ui.filter());

    if args.watch && !args.json && !args.csv {
        list_watch(ctx, filter, &args).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let manager = ctx.manager();
    let tasks = manager.query(filter, &args.search);

    if args.json {
        let mut s = serde_json::to_string_pretty(&tasks)?;
        s.push('\n');
        print!("{s}");
        return Ok(ExitCode::SUCCESS);
    }

    if args.csv {
        let mut t = Table::new(["id", "title", "description", "done", "created_at", "priority"]);
        for task in &tasks {
            t.row([
                task.id.clone(),
                task.title.clone(),
                task.description.clone(),
                task.done.to_string(),
                task.created_at.clone(),
                task.priority.map(|p| p.as_str().to_owned()).unwrap_or_default(),
            ]);
        }
        t.print_csv()?;
        return Ok(ExitCode::SUCCESS);
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(ExitCode::SUCCESS);
    }
    task_table(&ctx.cfg, &manager, &tasks).print()?;
    Ok(ExitCode::SUCCESS)
}

async fn list_watch(ctx: &Ctx, filter: FilterMode, args: &ListArgs) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_seconds.max(1)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                return Ok(());
            }
            _ = ticker.tick() => {
                print!("\x1b[H\x1b[2J");
                // Reload each tick so changes from other processes show up.
                let manager = ctx.manager();
                let tasks = manager.query(filter, &args.search);
                let stats = manager.stats();

                println!(
                    "{} - {filter} - {} active, {} done ({}%) - Updated: {}",
                    manager.key(),
                    stats.active,
                    stats.completed,
                    stats.progress(),
                    time::OffsetDateTime::now_utc()
                        .format(&time::format_description::well_known::Rfc3339)
                        .unwrap_or_else(|_| "unknown".to_owned())
                );
                println!();
                if tasks.is_empty() {
                    println!("No tasks found.");
                } else {
                    task_table(&ctx.cfg, &manager, &tasks).print()?;
                }
                println!("\n[Press Ctrl+C to exit]");
            }
        }
    }
}

fn task_table(cfg: &Config, manager: &TaskListManager<FileStore>, tasks: &[&Task]) -> Table {
    let with_priority = manager.options().supports_priority;
    let mut headers = vec!["ID", "TITLE", "STATUS"];
    if with_priority {
        headers.push("PRIORITY");
    }
    headers.push("CREATED");

    let mut t = Table::new(headers);
    for task in tasks {
        let id = if cfg.ui.icons {
            format!("{} {}", status_icon(task.done), task.id)
        } else {
            task.id.clone()
        };
        let mut row = vec![
            id,
            truncate(&task.title, 60),
            status_str(task.done).to_owned(),
        ];
        if with_priority {
            row.push(task.priority.unwrap_or_default().to_string());
        }
        row.push(format_timestamp(&task.created_at));
        t.row(row);
    }
    t
}

fn status_str(done: bool) -> &'static str {
    if done { "done" } else { "active" }
}

fn status_icon(done: bool) -> &'static str {
    if done { "✓" } else { "○" }
}

fn cmd_show(ctx: &Ctx, args: &PatternArgs) -> anyhow::Result<ExitCode> {
    let manager = ctx.manager();
    let task = manager.find(&args.pattern)?;

    println!("ID:          {}", task.id);
    println!("Title:       {}", task.title);
    println!("Status:      {}", status_str(task.done));
    if let Some(p) = task.priority {
        println!("Priority:    {p}");
    }
    println!("Created:     {}", format_timestamp(&task.created_at));
    if !task.description.is_empty() {
        println!("Description:");
        for line in task.description.lines() {
            println!("  {line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_stats(ctx: &Ctx, args: &StatsArgs) -> anyhow::Result<ExitCode> {
    let manager = ctx.manager();
    let stats = manager.stats();

    if args.json {
        let v = serde_json::json!({
            "key": manager.key(),
            "total": stats.total,
            "active": stats.active,
            "completed": stats.completed,
            "progress": stats.progress(),
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Key:       {}", manager.key());
    println!("Total:     {}", stats.total);
    println!("Active:    {}", stats.active);
    println!("Completed: {}", stats.completed);
    println!("Progress:  {}%", stats.progress());
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, serde::Deserialize)]
struct ImportEntry {
    #[serde(alias = "text")]
    title: String,
    #[serde(default, alias = "desc")]
    description: String,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ImportSummary {
    added: usize,
    duplicates: usize,
    ignored: usize,
}

fn parse_import(raw: &str) -> anyhow::Result<Vec<ImportEntry>> {
    // YAML is a superset of JSON, so one parser covers both.
    let entries: Vec<ImportEntry> =
        serde_yaml::from_str(raw).context("expected a list of tasks with at least a title")?;
    Ok(entries)
}

fn import_entries<S: crate::task::storage::KeyValueStore>(
    manager: &mut TaskListManager<S>,
    entries: Vec<ImportEntry>,
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for entry in entries {
        match manager.add_with_priority(
            &entry.title,
            &entry.description,
            entry.priority.unwrap_or_default(),
        ) {
            AddOutcome::Added { id } => {
                if entry.done {
                    manager.toggle_done(&id);
                }
                summary.added += 1;
            }
            AddOutcome::Duplicate { title } => {
                tracing::info!(title = %title, "skipping duplicate task during import");
                summary.duplicates += 1;
            }
            AddOutcome::Ignored => summary.ignored += 1,
        }
    }
    summary
}

fn cmd_import(ctx: &Ctx, args: &ImportArgs) -> anyhow::Result<ExitCode> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let entries =
        parse_import(&raw).with_context(|| format!("failed to parse {}", args.file.display()))?;

    let mut manager = ctx.manager();
    let summary = import_entries(&mut manager, entries);
    ensure_saved(&manager)?;

    println!(
        "Imported {} task(s) ({} duplicate, {} empty skipped)",
        summary.added, summary.duplicates, summary.ignored
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_keys(ctx: &Ctx) -> anyhow::Result<ExitCode> {
    let store = ctx.store();
    let keys = store.keys()?;
    if keys.is_empty() {
        println!("No lists stored in {}", config::tilde_path(&store.dir().to_string_lossy()));
        return Ok(ExitCode::SUCCESS);
    }
    for key in keys {
        let marker = if key == ctx.key { "*" } else { " " };
        println!("{marker} {key}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    match args.cmd {
        ConfigCmd::List => {
            print!("{}", config::list_resolved_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        ConfigCmd::Set(set) => {
            config::set_value_string(&set.key, &set.value)?;
            println!("Set {} = {}", set.key, set.value);
            Ok(ExitCode::SUCCESS)
        }
        ConfigCmd::Get(get) => match config::get_value_string(&get.key)? {
            Some(v) => {
                println!("{v}");
                Ok(ExitCode::SUCCESS)
            }
            None => anyhow::bail!(
                "configuration key '{}' not found - use 'tasklist config list' to see available keys",
                get.key
            ),
        },
    }
}

fn cmd_version() -> ExitCode {
    println!("tasklist version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}
