//! Subcommand handlers.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use jnl_journal::{
    Database, Editor, Git, JournalConfig, SearchOptions, compile_pattern, project_name, search,
};
use tracing::{info, warn};

use crate::render::{self, Palette};
use crate::{Commands, SyncMode};

pub(crate) fn dispatch(command: Commands, config: JournalConfig) -> Result<()> {
    let editor = Editor::from_config(&config);
    let mut db = Database::open(config).context("failed to load journal")?;

    match command {
        Commands::Proj { name } => proj(&db, &editor, name),
        Commands::New => {
            let path = db.create_entry(&[])?.file_path();
            editor.open(&path)?;
            Ok(())
        }
        Commands::Today => {
            let path = db.daily_entry(None)?.file_path();
            editor.open(&path)?;
            scan(&db)
        }
        Commands::Yesterday => {
            let path = db.yesterday_entry()?.file_path();
            editor.open(&path)?;
            scan(&db)
        }
        Commands::Open { guid } => {
            editor.open_entry(db.entry_with_guid(&guid)?)?;
            Ok(())
        }
        Commands::Scan => scan(&db),
        Commands::Stat => {
            git(&db).status()?;
            Ok(())
        }
        Commands::Sync { mode } => {
            let git = git(&db);
            git.pull()?;
            scan(&db)?;
            git.status()?;
            if mode == Some(SyncMode::Push) {
                git.autopush()?;
            }
            Ok(())
        }
        Commands::Search { pattern } => search_and_open(&db, &editor, &pattern),
        Commands::Tagged { name, value } => tagged(&db, &name, value.as_deref()),
    }
}

fn git(db: &Database) -> Git {
    Git::new(db.layout().root())
}

fn scan(db: &Database) -> Result<()> {
    let report = db.scan().context("scan failed")?;
    info!(
        "{} entries, {} quick links, {} stale paths removed",
        report.entries_scanned,
        report.links_created + report.links_existing,
        report.stale_removed
    );
    Ok(())
}

fn proj(db: &Database, editor: &Editor, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => {
            let cwd = std::env::current_dir()?;
            project_name(&cwd).with_context(|| {
                format!("no project given and no .project file in {}", cwd.display())
            })?
        }
    };

    let entries = db.entries_with_project(&name)?;
    if entries.is_empty() {
        warn!("No entries for project {name}");
    }
    for entry in entries {
        editor.open_entry(entry)?;
    }
    Ok(())
}

fn search_and_open(db: &Database, editor: &Editor, source: &str) -> Result<()> {
    let pattern = compile_pattern(source)?;
    let results = search(db, &pattern, SearchOptions::default())?;

    let stdout = io::stdout();
    let palette = Palette::new(stdout.is_terminal());
    let mut out = stdout.lock();
    render::write_results(&mut out, &results, &palette)?;
    if results.is_empty() {
        return Ok(());
    }

    let Some(choice) = render::read_choice(&mut io::stdin().lock(), &mut out)? else {
        return Ok(());
    };
    let Some(hit) = results.choose(choice) else {
        bail!("no result numbered {choice}");
    };
    editor.open_entry(hit.entry)?;
    Ok(())
}

fn tagged(db: &Database, name: &str, value: Option<&str>) -> Result<()> {
    let mut out = io::stdout().lock();
    for entry in db.entries_with_tag(name, value)? {
        writeln!(out, "{}  {}", entry.guid(), entry.file_name())?;
    }
    Ok(())
}
