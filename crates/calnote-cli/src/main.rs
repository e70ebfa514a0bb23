//! calnote CLI: periodic notes for a markdown vault.
//!
//! Commands: init, path, open, list, expand, calendar, watch, completions

mod terminal;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;

use calnote_core::{
    expand_template, CalnoteConfig, Clock, Granularity, SettingsProvider, SystemClock,
    TemplateContext,
};
use calnote_resolver::labels::{decorate_header, month_weeks};
use calnote_resolver::{
    AutoConfirm, CalendarIndexes, Confirm, Host, NoteResolver, OpenTarget, Resolution,
};
use calnote_vault::{FsFoldStore, FsVault, VaultWatcher};

use terminal::{render_grid, HeaderLine, StderrNotifier, StdinConfirm, TerminalWorkspace};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Parser)]
#[command(name = "calnote")]
#[command(version)]
#[command(about = "Daily, weekly, monthly, quarterly and yearly notes for a markdown vault")]
struct Cli {
    /// Vault directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config to .calnote/config.yaml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Print the note path for a period
    Path {
        granularity: Granularity,
        /// Any date inside the period (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Open the note for a period, creating it when missing
    #[command(alias = "o")]
    Open {
        granularity: Granularity,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Move this many periods forward (negative for back)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
        /// Open in a new split
        #[arg(long)]
        split: bool,
        /// Create without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// List existing notes of a granularity as JSON
    #[command(alias = "ls")]
    List { granularity: Granularity },
    /// Expand a template file for a date and print the result
    Expand {
        #[arg(long)]
        template: PathBuf,
        #[arg(long, default_value = "day")]
        granularity: Granularity,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show a month with its header labels and note indicators
    #[command(alias = "cal")]
    Calendar {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
        /// Print JSON instead of the grid
        #[arg(long)]
        json: bool,
    },
    /// Rebuild note indexes whenever the vault changes
    Watch {
        /// Exit after the first batch of changes
        #[arg(long)]
        once: bool,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

fn parse_month(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{s}'"))
}

/// Vault, config and clock shared by every command.
struct App {
    vault: FsVault,
    folds: FsFoldStore,
    config: CalnoteConfig,
    clock: SystemClock,
}

impl App {
    fn open(root: &Path) -> Result<Self> {
        let vault = FsVault::open(root)
            .with_context(|| format!("cannot open vault at {}", root.display()))?;
        let config_path = vault.state_dir().join(CONFIG_FILE);
        let config = CalnoteConfig::load(&config_path)
            .with_context(|| format!("cannot load {}", config_path.display()))?;
        let folds = FsFoldStore::for_vault(&vault);
        Ok(Self {
            vault,
            folds,
            config,
            clock: SystemClock,
        })
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Run `f` with a resolver wired to terminal collaborators.
    fn with_resolver<T>(
        &self,
        assume_yes: bool,
        f: impl FnOnce(&mut NoteResolver<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut workspace = TerminalWorkspace::new(self.vault.root().to_path_buf());
        let mut auto = AutoConfirm;
        let mut stdin = StdinConfirm;
        let confirm: &mut dyn Confirm = if assume_yes { &mut auto } else { &mut stdin };
        let notifier = StderrNotifier;

        let host = Host {
            vault: &self.vault,
            metadata: &self.vault,
            workspace: &mut workspace,
            confirm,
            notifier: &notifier,
            folds: Some(&self.folds),
        };
        let mut resolver = NoteResolver::new(host, &self.config, &self.clock);
        f(&mut resolver)
    }
}

#[derive(Serialize)]
struct OpenOutput {
    path: Option<String>,
    uid: String,
    created: bool,
    declined: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.vault, force),
        Commands::Path { granularity, date } => {
            let app = App::open(&cli.vault)?;
            let date = date.unwrap_or_else(|| app.today());
            app.with_resolver(true, |resolver| {
                let period = resolver.period(date, granularity);
                println!("{}", resolver.note_path(&period));
                Ok(())
            })
        }
        Commands::Open {
            granularity,
            date,
            offset,
            split,
            yes,
        } => {
            let app = App::open(&cli.vault)?;
            let date = date.unwrap_or_else(|| app.today());
            let target = if split || app.config.open_in_new_split {
                OpenTarget::Split
            } else {
                OpenTarget::Reuse
            };
            let output = app.with_resolver(yes, |resolver| {
                let period = resolver
                    .period(date, granularity)
                    .offset(offset)
                    .with_context(|| format!("offset {offset} is outside the calendar"))?;
                let resolution = resolver
                    .open(&period, target)
                    .with_context(|| format!("cannot open {}", resolver.note_path(&period)))?;
                Ok(OpenOutput {
                    path: resolution.file().map(|f| f.path.to_string()),
                    uid: period.date_uid(),
                    created: resolution.was_created(),
                    declined: resolution == Resolution::Declined,
                })
            })?;
            print_json(&output)
        }
        Commands::List { granularity } => {
            let app = App::open(&cli.vault)?;
            let index = app.with_resolver(true, |resolver| Ok(resolver.index(granularity)?))?;
            let listing: BTreeMap<&str, &str> = index
                .iter()
                .map(|(uid, file)| (uid, file.path.as_str()))
                .collect();
            print_json(&listing)
        }
        Commands::Expand {
            template,
            granularity,
            date,
        } => {
            let app = App::open(&cli.vault)?;
            let text = fs::read_to_string(&template)
                .with_context(|| format!("cannot read template {}", template.display()))?;
            let date = date.unwrap_or_else(|| app.today());
            let expanded = app.with_resolver(true, |resolver| {
                let period = resolver.period(date, granularity);
                let settings = resolver.settings_for(granularity);
                let locale = resolver.locale();
                let ctx = TemplateContext {
                    date: period.start,
                    format: &settings.format,
                    locale: &locale,
                    now: app.clock.now(),
                };
                Ok(expand_template(&text, &ctx))
            })?;
            print!("{expanded}");
            Ok(())
        }
        Commands::Calendar { month, json } => {
            let app = App::open(&cli.vault)?;
            let displayed = month.unwrap_or_else(|| app.today());
            cmd_calendar(&app, displayed, json)
        }
        Commands::Watch { once } => cmd_watch(&cli.vault, once),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "calnote", &mut io::stdout());
            Ok(())
        }
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<()> {
    let vault = FsVault::open(root)
        .with_context(|| format!("cannot open vault at {}", root.display()))?;
    let state_dir = vault.state_dir();
    let config_path = state_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::create_dir_all(&state_dir)
        .with_context(|| format!("cannot create {}", state_dir.display()))?;
    let yaml = CalnoteConfig::with_explicit_defaults().to_yaml()?;
    fs::write(&config_path, yaml)
        .with_context(|| format!("cannot write {}", config_path.display()))?;

    tracing::info!(path = %config_path.display(), "wrote default config");
    println!("Initialized calnote vault at {}", vault.root().display());
    Ok(())
}

fn cmd_calendar(app: &App, displayed: NaiveDate, json: bool) -> Result<()> {
    let locale = app.config.locale();
    let indexes = app.with_resolver(true, |resolver| Ok(CalendarIndexes::build(resolver)?))?;

    let mut header = HeaderLine::default();
    decorate_header(displayed, &locale, &indexes, &mut header);
    let rows = month_weeks(displayed, &locale, &indexes);

    if !json {
        println!("{}", header.render());
        print!("{}", render_grid(&rows, &locale));
        return Ok(());
    }

    let labels: Vec<_> = header
        .labels
        .iter()
        .map(|label| {
            serde_json::json!({
                "granularity": label.period.granularity,
                "text": label.text,
                "uid": label.date_uid,
                "has_note": label.has_note,
            })
        })
        .collect();
    let weeks: Vec<_> = rows
        .iter()
        .map(|row| {
            let days: Vec<_> = row
                .days
                .iter()
                .map(|day| {
                    serde_json::json!({
                        "date": day.date,
                        "in_month": day.in_month,
                        "has_note": day.has_note,
                    })
                })
                .collect();
            serde_json::json!({
                "number": row.number,
                "uid": row.week.date_uid(),
                "has_note": row.has_note,
                "days": days,
            })
        })
        .collect();
    print_json(&serde_json::json!({
        "month": format!("{}-{:02}", displayed.year(), displayed.month()),
        "labels": labels,
        "weeks": weeks,
    }))
}

fn cmd_watch(root: &Path, once: bool) -> Result<()> {
    let app = App::open(root)?;
    let watcher = VaultWatcher::start(app.vault.root())
        .with_context(|| format!("cannot watch {}", root.display()))?;
    eprintln!("Watching {} (Ctrl-C to stop)", app.vault.root().display());

    loop {
        let batch = watcher.next_batch(Duration::from_secs(3600), Duration::from_millis(200));
        if batch.is_empty() {
            continue;
        }
        tracing::debug!(events = batch.len(), "vault changed");

        let indexes = app.with_resolver(true, |resolver| Ok(CalendarIndexes::build(resolver)?))?;
        let counts: BTreeMap<&str, usize> = Granularity::ALL
            .iter()
            .map(|g| (g.as_str(), indexes.get(*g).map_or(0, |index| index.len())))
            .collect();
        println!(
            "{}",
            serde_json::json!({ "changed": batch.len(), "notes": counts })
        );

        if once {
            return Ok(());
        }
    }
}
