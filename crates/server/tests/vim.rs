//! Talking to a stand-in `vim` executable

use std::{
    fs,
    io::IsTerminal,
    os::unix::fs::PermissionsExt,
    path::PathBuf,
    time::Duration,
};

use engine::{
    Location, Status, SyncEngine, SyncError, UpdateRequest,
    testing::FakeDebugger,
};
use eyre::{Result, WrapErr};
use server::{VimEditor, VimServer};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init() {
    if std::io::stderr().is_terminal() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init();
    }

    let _ = color_eyre::install();
}

/// A `vim` that logs its arguments, knows about the servers `OTHER`,
/// `VIMGDB` and `BROKEN`, and fails any remote call to `BROKEN`
struct FakeVim {
    dir: TempDir,
    executable: PathBuf,
}

impl FakeVim {
    fn new() -> Result<Self> {
        let dir = tempfile::tempdir().wrap_err("creating temp dir")?;
        let executable = dir.path().join("vim");
        let log = dir.path().join("calls.log");
        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> "{log}"
case "$1" in
  --serverlist)
    printf 'OTHER\nVIMGDB\nBROKEN\n'
    ;;
  --servername)
    if [ "$2" = "BROKEN" ]; then
      echo "E241: Unable to send to BROKEN" >&2
      exit 1
    fi
    ;;
esac
"#,
            log = log.display()
        );
        fs::write(&executable, script).wrap_err("writing fake vim")?;
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755))?;
        Ok(Self { dir, executable })
    }

    fn server(&self, name: &str) -> VimServer {
        VimServer::new(&self.executable, name).with_timeout(Duration::from_secs(5))
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

#[test]
fn server_list() -> Result<()> {
    let vim = FakeVim::new()?;

    assert_eq!(vim.server("VIMGDB").server_list()?, vec!["OTHER", "VIMGDB", "BROKEN"]);
    assert!(vim.server("vimgdb").is_running());
    assert!(!vim.server("ELSEWHERE").is_running());
    Ok(())
}

#[test]
fn missing_executable() {
    let server = VimServer::new("/nonexistent/vim", "VIMGDB");
    assert!(server.server_list().is_err());
    assert!(!server.is_running());
}

#[test]
fn start_sources_vimrc() -> Result<()> {
    let vim = FakeVim::new()?;
    let vimrc = vim.file("vimrc", b"sign define VimgdbDummy\n")?;
    let source = vim.file("prog.c", b"int main(void) { return 0; }\n")?;

    vim.server("VIMGDB").start(&vimrc, &[source.clone()])?;

    assert_eq!(
        vim.calls(),
        vec![format!(
            "--servername VIMGDB -n -c source {} {}",
            vimrc.display(),
            source.display()
        )]
    );
    Ok(())
}

#[test]
fn start_without_vimrc() -> Result<()> {
    let vim = FakeVim::new()?;
    let vimrc = vim.dir.path().join("missing-vimrc");

    let err = vim.server("VIMGDB").start(&vimrc, &[]).unwrap_err();
    assert!(
        matches!(err.downcast_ref::<SyncError>(), Some(SyncError::ConfigMissing(path)) if path == &vimrc),
        "{err:?}"
    );
    assert!(vim.calls().is_empty());
    Ok(())
}

#[test]
fn start_rejects_binary_files() -> Result<()> {
    let vim = FakeVim::new()?;
    let vimrc = vim.file("vimrc", b"\n")?;
    let binary = vim.file("prog", b"\x7fELF\x02\x01\x01\x00\x00")?;

    let err = vim.server("VIMGDB").start(&vimrc, &[binary]).unwrap_err();
    assert!(err.to_string().contains("not a text file"), "{err:?}");
    assert!(vim.calls().is_empty());
    Ok(())
}

fn sync_engine(vim: &FakeVim, name: &str) -> (FakeDebugger, SyncEngine<FakeDebugger, VimEditor>) {
    let debugger = FakeDebugger::default();
    debugger.set_current(Location::new("/src/prog.c", "prog.c", 5));
    debugger.set_executing(true);
    let engine = SyncEngine::new(debugger.clone(), VimEditor::new(vim.server(name)));
    (debugger, engine)
}

#[test]
fn update_is_one_remote_call() -> Result<()> {
    let vim = FakeVim::new()?;
    let (_debugger, mut engine) = sync_engine(&vim, "VIMGDB");

    let status = engine.update(&UpdateRequest::new().force(true).goto_line(true))?;
    assert!(matches!(status, Status::Sent(_)), "{status:?}");

    let calls = vim.calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    assert_eq!(calls[0], "--serverlist");
    let call = &calls[1];
    assert!(call.starts_with("--servername VIMGDB --remote-expr execute(["), "{call}");
    assert!(call.contains("'edit ' . fnameescape('/src/prog.c')"), "{call}");
    assert!(call.contains("name=VimgdbLocation"), "{call}");
    assert!(call.ends_with("'redraw!'])"), "{call}");

    assert_eq!(engine.state().highlight(), Some(5));
    Ok(())
}

#[test]
fn missing_server_is_not_sent_to() -> Result<()> {
    let vim = FakeVim::new()?;
    let (_debugger, mut engine) = sync_engine(&vim, "ELSEWHERE");

    let err = engine
        .update(&UpdateRequest::new().force(true).goto_line(true))
        .unwrap_err();
    assert!(matches!(err, SyncError::TransportUnavailable(_)), "{err:?}");
    assert!(engine.state().is_empty());
    assert_eq!(vim.calls(), vec!["--serverlist"]);
    Ok(())
}

#[test]
fn failed_remote_call_resets_state() -> Result<()> {
    let vim = FakeVim::new()?;
    let (_debugger, mut engine) = sync_engine(&vim, "BROKEN");

    let err = engine
        .update(&UpdateRequest::new().force(true).goto_line(true))
        .unwrap_err();
    assert!(matches!(err, SyncError::TransportUnavailable(_)), "{err:?}");
    assert!(engine.state().is_empty());
    let calls = vim.calls();
    assert!(
        calls[1].starts_with("--servername BROKEN --remote-expr"),
        "{calls:?}"
    );
    Ok(())
}

#[test]
fn remote_expr_passes_expression_through() -> Result<()> {
    let vim = FakeVim::new()?;

    vim.server("VIMGDB").remote_expr("line('.')")?;
    assert_eq!(vim.calls(), vec!["--servername VIMGDB --remote-expr line('.')"]);
    Ok(())
}
