use std::{fs::create_dir_all, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use config::Config;
use debugger::GdbDebugger;
use server::{VimEditor, VimServer};
use tracing_subscriber::filter::EnvFilter;

use crate::app::{App, ShouldQuit};

mod app;

/// Keep Vim in sync with a GDB session
///
/// Run once to start Vim as a server, then again in another terminal to
/// debug. The second run starts GDB with ARGS and shows where the program
/// is stopped, and its breakpoints, in Vim.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[clap(short, long)]
    verbose: bool,

    /// Name of the Vim server
    #[clap(short, long)]
    servername: Option<String>,

    /// Where to write the log
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// Files to open in Vim, or arguments for GDB
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("vimgdb")
        .join("vimgdb.log")
}

fn init_logging(path: PathBuf, debug: bool) -> eyre::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).context("creating log directory")?;
    }
    let log_file = std::fs::File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
    .context("loading configuration")?;
    if let Some(servername) = &args.servername {
        config.servername = servername.clone();
    }
    config.debug |= args.verbose;

    init_logging(
        args.log_file.clone().unwrap_or_else(default_log_file),
        config.debug,
    )?;
    tracing::debug!(?args, ?config, "starting");

    let server = VimServer::new(&config.vim, &config.servername)
        .with_timeout(config.remote_timeout());
    if !server.is_running() {
        tracing::info!(servername = %config.servername, "starting vim");
        let files: Vec<PathBuf> = args.args.iter().map(PathBuf::from).collect();
        return server.start(&config.vimrc, &files).context("running vim");
    }

    run_console(&config, server, &args.args)
}

fn run_console(config: &Config, server: VimServer, gdb_args: &[String]) -> eyre::Result<()> {
    let (debugger, notifications) = GdbDebugger::spawn(
        &config.gdb,
        config.gdbinit.as_deref(),
        gdb_args,
        config.command_timeout(),
        config.history_size,
    )
    .context("starting debugger")?;
    tracing::debug!("debugger started");

    let mut app = App::new(
        debugger,
        VimEditor::new(server),
        notifications,
        app::spawn_input_thread(),
        config.debug,
    );
    if !gdb_args.is_empty() {
        app.program_loaded();
    }

    loop {
        match app.loop_step() {
            Ok(ShouldQuit::True) => break,
            Ok(ShouldQuit::False) => {}
            Err(e) => eyre::bail!("Error running command: {e:?}"),
        }
    }

    Ok(())
}
