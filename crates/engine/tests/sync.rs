use std::collections::BTreeSet;
use std::io::IsTerminal;

use engine::{
    BreakpointInfo, DebuggerEvent, Instruction, Location, MarkerKind, Status, SubCommand,
    SyncEngine, SyncError, UpdateRequest,
    testing::{FakeDebugger, RecordingEditor},
};
use tracing_subscriber::EnvFilter;

// test suite "constructor"
#[ctor::ctor]
fn init() {
    let in_ci = std::env::var("CI")
        .map(|val| val == "true")
        .unwrap_or(false);

    if std::io::stderr().is_terminal() || in_ci {
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

struct Harness {
    engine: SyncEngine<FakeDebugger, RecordingEditor>,
    debugger: FakeDebugger,
    editor: RecordingEditor,
}

impl Harness {
    fn new() -> Self {
        let debugger = FakeDebugger::default();
        let editor = RecordingEditor::default();
        Self {
            engine: SyncEngine::new(debugger.clone(), editor.clone()),
            debugger,
            editor,
        }
    }

    /// Stopped at `/src/a.c:10` with breakpoints on lines 5 (enabled) and
    /// 10 (disabled)
    fn stopped_in_a() -> Self {
        let harness = Self::new();
        harness.debugger.set_executing(true);
        harness
            .debugger
            .set_current(Location::new("/src/a.c", "a.c", 10));
        harness.debugger.set_breakpoints(vec![
            BreakpointInfo::new(1, "a.c", 5, true),
            BreakpointInfo::new(2, "a.c", 10, false),
        ]);
        harness
    }

    fn last_batch(&self) -> Vec<Instruction> {
        self.editor.last_batch().expect("a batch was sent")
    }
}

fn open(path: &str) -> Instruction {
    Instruction::OpenFile {
        path: path.to_string(),
    }
}

fn place(line: u32, kind: MarkerKind) -> Instruction {
    Instruction::PlaceMarker { line, kind }
}

#[test]
fn first_stop_builds_the_whole_view() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();

    let status = harness.engine.handle(&DebuggerEvent::Stopped)?;

    assert_eq!(
        harness.last_batch(),
        vec![
            open("/src/a.c"),
            Instruction::ResetMarkers,
            place(5, MarkerKind::BreakpointEnabled),
            place(10, MarkerKind::BreakpointDisabled),
            Instruction::MoveCursor { line: 10 },
            place(10, MarkerKind::ExecutionLine),
            Instruction::Redraw,
        ]
    );
    assert_eq!(status, Status::Sent(7));

    let state = harness.engine.state();
    assert_eq!(
        state.open_file(),
        Some(&Location::new("/src/a.c", "a.c", 10))
    );
    assert_eq!(state.breakpoint_lines(), &BTreeSet::from([5, 10]));
    assert!(state.highlight_active());
    Ok(())
}

#[test]
fn deleting_a_breakpoint_only_clears_its_marker() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    // the debugger may still list it while the deletion notification runs
    harness
        .engine
        .handle(&DebuggerEvent::BreakpointDeleted { id: 1 })?;

    assert_eq!(
        harness.last_batch(),
        vec![Instruction::ClearMarker { line: 5 }, Instruction::Redraw]
    );
    assert_eq!(
        harness.engine.state().breakpoint_lines(),
        &BTreeSet::from([10])
    );
    Ok(())
}

#[test]
fn repeated_forced_update_is_a_no_op() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    let request = UpdateRequest::new().force(true);

    assert!(matches!(
        harness.engine.update(&request)?,
        Status::Sent(_)
    ));
    assert_eq!(harness.engine.update(&request)?, Status::NoChange);
    assert_eq!(harness.editor.batches().len(), 1);
    Ok(())
}

#[test]
fn breakpoint_diff_touches_only_changed_lines() -> eyre::Result<()> {
    let mut harness = Harness::new();
    harness.debugger.set_executing(true);
    harness
        .debugger
        .set_current(Location::new("/src/a.c", "a.c", 1));
    harness.debugger.set_breakpoints(vec![
        BreakpointInfo::new(1, "a.c", 3, true),
        BreakpointInfo::new(2, "a.c", 7, true),
    ]);
    harness.engine.update(&UpdateRequest::new())?;

    harness.debugger.set_breakpoints(vec![
        BreakpointInfo::new(2, "a.c", 7, true),
        BreakpointInfo::new(3, "a.c", 9, true),
    ]);
    harness.engine.update(&UpdateRequest::new())?;

    let batch = harness.last_batch();
    assert_eq!(
        batch,
        vec![
            place(9, MarkerKind::BreakpointEnabled),
            Instruction::ClearMarker { line: 3 },
            Instruction::Redraw,
        ]
    );
    assert!(!batch.iter().any(|i| matches!(
        i,
        Instruction::PlaceMarker { line: 7, .. } | Instruction::ClearMarker { line: 7 }
    )));
    assert_eq!(
        harness.engine.state().breakpoint_lines(),
        &BTreeSet::from([7, 9])
    );
    Ok(())
}

#[test]
fn file_switch_resets_before_setting() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    harness
        .debugger
        .set_current(Location::new("/src/b.c", "b.c", 2));
    harness.debugger.set_breakpoints(vec![
        BreakpointInfo::new(1, "a.c", 5, true),
        BreakpointInfo::new(4, "b.c", 30, true),
        BreakpointInfo::new(5, "b.c", 4, false),
    ]);
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    let batch = harness.last_batch();
    let reset = batch
        .iter()
        .position(|i| *i == Instruction::ResetMarkers)
        .expect("markers reset");
    let first_set = batch
        .iter()
        .position(|i| matches!(i, Instruction::PlaceMarker { .. }))
        .expect("markers set");
    assert!(reset < first_set);
    assert_eq!(batch[0], open("/src/b.c"));
    assert!(batch.contains(&place(4, MarkerKind::BreakpointDisabled)));
    assert!(batch.contains(&place(30, MarkerKind::BreakpointEnabled)));
    assert!(!batch.contains(&place(5, MarkerKind::BreakpointEnabled)));
    assert_eq!(
        harness.engine.state().breakpoint_lines(),
        &BTreeSet::from([4, 30])
    );
    Ok(())
}

#[test]
fn toggling_a_breakpoint_redraws_its_marker() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    harness.debugger.set_breakpoints(vec![
        BreakpointInfo::new(1, "a.c", 5, false),
        BreakpointInfo::new(2, "a.c", 10, false),
    ]);
    harness
        .engine
        .handle(&DebuggerEvent::BreakpointModified { id: 1 })?;

    assert_eq!(
        harness.last_batch(),
        vec![place(5, MarkerKind::BreakpointDisabled), Instruction::Redraw]
    );
    Ok(())
}

#[test]
fn unforced_update_while_not_executing_sends_nothing() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.debugger.set_executing(false);

    assert_eq!(harness.engine.update(&UpdateRequest::new())?, Status::Skipped);
    assert!(harness.editor.batches().is_empty());
    assert_eq!(harness.debugger.breakpoint_queries(), 0);
    assert!(harness.engine.state().is_empty());
    Ok(())
}

#[test]
fn transport_failure_forces_full_rebuild() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    harness.editor.set_reachable(false);
    harness.debugger.set_breakpoints(vec![BreakpointInfo::new(1, "a.c", 5, true)]);
    let result = harness.engine.update(&UpdateRequest::new());
    assert!(matches!(result, Err(SyncError::TransportUnavailable(_))));
    assert!(harness.engine.state().is_empty());

    harness.editor.set_reachable(true);
    harness.engine.update(&UpdateRequest::new())?;
    assert_eq!(
        harness.last_batch(),
        vec![
            open("/src/a.c"),
            Instruction::ResetMarkers,
            place(5, MarkerKind::BreakpointEnabled),
            place(10, MarkerKind::ExecutionLine),
            Instruction::Redraw,
        ]
    );
    Ok(())
}

#[test]
fn dispatch_swallows_failures() {
    let mut harness = Harness::stopped_in_a();
    harness.editor.set_reachable(false);

    harness.engine.dispatch(&DebuggerEvent::Stopped);
    assert!(harness.engine.state().is_empty());

    harness
        .debugger
        .set_current(Location::new("/gone.c", "gone.c", 1));
    harness.debugger.set_executing(false);
    harness.engine.dispatch(&DebuggerEvent::ExecutableLoaded);
}

#[test]
fn breakpoint_created_does_not_move_cursor() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    harness.debugger.set_breakpoints(vec![
        BreakpointInfo::new(1, "a.c", 5, true),
        BreakpointInfo::new(2, "a.c", 10, false),
        BreakpointInfo::new(3, "a.c", 14, true),
    ]);
    harness
        .engine
        .handle(&DebuggerEvent::BreakpointCreated { id: 3 })?;

    assert_eq!(
        harness.last_batch(),
        vec![place(14, MarkerKind::BreakpointEnabled), Instruction::Redraw]
    );
    Ok(())
}

#[test]
fn executable_loaded_shows_main() -> eyre::Result<()> {
    let mut harness = Harness::new();
    harness
        .debugger
        .add_location("main", Location::new("/src/prog.c", "prog.c", 4));
    harness
        .debugger
        .add_function("main", Location::new("/src/prog.c", "prog.c", 4));
    harness
        .debugger
        .set_breakpoints(vec![BreakpointInfo::new(1, "prog.c", 6, true)]);
    harness.debugger.push_history("file ./prog");

    harness.engine.handle(&DebuggerEvent::ExecutableLoaded)?;

    assert_eq!(
        harness.last_batch(),
        vec![
            open("/src/prog.c"),
            Instruction::ResetMarkers,
            place(6, MarkerKind::BreakpointEnabled),
            Instruction::MoveCursor { line: 5 },
            Instruction::Redraw,
        ]
    );
    assert!(!harness.engine.state().highlight_active());
    Ok(())
}

#[test]
fn library_load_while_executing_leaves_highlight_alone() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;
    harness
        .debugger
        .add_location("main", Location::new("/src/a.c", "a.c", 2));
    harness
        .debugger
        .add_function("main", Location::new("/src/a.c", "a.c", 2));
    harness.debugger.push_history("next");

    harness.engine.handle(&DebuggerEvent::ExecutableLoaded)?;

    let batch = harness.last_batch();
    assert!(
        batch.iter().all(|i| !matches!(
            i,
            Instruction::ClearExecutionLine
                | Instruction::PlaceMarker {
                    kind: MarkerKind::ExecutionLine,
                    ..
                }
        )),
        "{batch:?}"
    );
    assert!(batch.contains(&Instruction::MoveCursor { line: 3 }));
    assert!(!harness.engine.state().highlight_active());
    Ok(())
}

#[test]
fn executable_loaded_after_run_waits_for_stop() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;
    harness.debugger.push_history("run");

    assert_eq!(
        harness.engine.handle(&DebuggerEvent::ExecutableLoaded)?,
        Status::Skipped
    );
    assert_eq!(harness.editor.batches().len(), 1);
    assert!(harness.engine.state().is_empty());
    Ok(())
}

#[test]
fn exit_clears_highlight() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    harness.engine.handle(&DebuggerEvent::Exited)?;
    assert_eq!(
        harness.last_batch(),
        vec![Instruction::ClearExecutionLine, Instruction::Redraw]
    );
    assert!(harness.engine.state().is_empty());
    Ok(())
}

#[test]
fn sync_command_goes_to_location() -> eyre::Result<()> {
    let mut harness = Harness::stopped_in_a();
    harness
        .debugger
        .add_location("a.c:20", Location::new("/src/a.c", "a.c", 20));
    harness.engine.handle(&DebuggerEvent::Stopped)?;

    let command: SubCommand = "sync a.c:20".parse()?;
    harness.engine.run_command(&command)?;

    assert_eq!(
        harness.last_batch(),
        vec![Instruction::MoveCursor { line: 20 }, Instruction::Redraw]
    );
    Ok(())
}
