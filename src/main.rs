// SPDX-License-Identifier: MIT
//
// vimode: headless driver for the modal command interpreter.
//
// Loads files into a Workspace, feeds a key script through a Session and
// prints or writes the result. Each key flows through:
//
//   script → parse_keys → Session::handle_key → TextBuffer edits
//                              │
//                              └─ PassThrough (Insert mode) → Workspace::type_key
//
// Stops early once the last document is closed (`:q`, `ZZ`).

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vimode_core::{KeyOutcome, Options, Session, TextBuffer, Workspace, status_line};
use vimode_keys::{KeyEvent, parse_keys};

// ─── Command line ───────────────────────────────────────────────────────────

/// Run Vim-style key scripts against text files.
#[derive(Parser, Debug)]
#[command(name = "vimode")]
#[command(version)]
struct Cli {
    /// Files to load; the first one is current. None gives a scratch buffer.
    files: Vec<PathBuf>,

    /// Key script in `<Esc>`/`<CR>`/`<C-r>` notation.
    #[arg(short, long, value_name = "KEYS", conflicts_with = "keys_file")]
    keys: Option<String>,

    /// Read the key script from a file (`-` for stdin).
    #[arg(short = 'f', long, value_name = "PATH")]
    keys_file: Option<PathBuf>,

    /// Apply a `:set` argument before the script runs. Repeatable.
    #[arg(short, long = "set", value_name = "OPTION")]
    set: Vec<String>,

    /// Lines visible in the viewport (H, M, L, zz).
    #[arg(long, default_value_t = 24)]
    height: usize,

    /// Print the current document to stdout afterwards.
    #[arg(short, long)]
    print: bool,

    /// Print the status line to stderr afterwards.
    #[arg(long)]
    status: bool,

    /// Save every modified document afterwards.
    #[arg(short, long)]
    write: bool,

    /// Debug logging (overridden by VIMODE_LOG).
    #[arg(short, long)]
    verbose: bool,
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VIMODE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_script(cli: &Cli) -> Result<String> {
    if let Some(keys) = &cli.keys {
        return Ok(keys.clone());
    }
    let mut script = String::new();
    match &cli.keys_file {
        Some(path) if path.as_os_str() != "-" => {
            script = fs::read_to_string(path)
                .with_context(|| format!("reading key script {}", path.display()))?;
        }
        _ => {
            io::stdin()
                .read_to_string(&mut script)
                .context("reading key script from stdin")?;
        }
    }
    // A script file normally ends with a newline that is not meant as a key.
    Ok(script.trim_end_matches(['\n', '\r']).to_string())
}

fn build_options(sets: &[String]) -> Result<Options> {
    let mut options = Options::default();
    for arg in sets {
        if let Some(shown) = options
            .apply(arg)
            .with_context(|| format!("--set {arg}"))?
        {
            info!("{shown}");
        }
    }
    Ok(options)
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// Feed `keys` until they run out or the workspace finishes. Returns the
/// number of keys consumed.
fn drive(session: &mut Session, ws: &mut Workspace, keys: &[KeyEvent]) -> usize {
    for (i, &key) in keys.iter().enumerate() {
        if ws.is_finished() {
            return i;
        }
        if session.handle_key(ws, key) == KeyOutcome::PassThrough && !ws.type_key(key) {
            debug!(%key, "no insert-mode meaning");
        }
    }
    keys.len()
}

fn run(cli: &Cli) -> Result<()> {
    let options = build_options(&cli.set)?;
    let script = read_script(cli)?;
    let keys = parse_keys(&script).context("parsing key script")?;

    let mut ws = Workspace::from_files(&cli.files)
        .context("loading files")?
        .with_height(cli.height);
    let mut session = Session::with_options(options);

    let used = drive(&mut session, &mut ws, &keys);
    info!(used, total = keys.len(), finished = ws.is_finished(), "script done");
    if let Some(msg) = session.message() {
        info!("{msg}");
    }

    if cli.status {
        eprintln!("{}", status_line(&session, &ws, 80));
    }
    if cli.write {
        ws.save_all().context("writing files")?;
    }
    if cli.print {
        if ws.is_finished() {
            bail!("nothing to print: every document was closed");
        }
        let mut out = io::stdout().lock();
        out.write_all(ws.contents().as_bytes())?;
        out.flush()?;
    }
    debug!(cursor = %ws.cursor(), "final cursor");
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    run(&cli)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
