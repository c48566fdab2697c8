//! Reading engine types out of MI results
use engine::{BreakpointId, BreakpointInfo, Location};
use gdbmi::{Results, Value};

/// A frame tuple or `-file-list-exec-source-file` result
pub(crate) fn location_from(results: &Results) -> Option<Location> {
    let full_path = results.get_str("fullname")?;
    let relative_path = results.get_str("file").unwrap_or(full_path);
    let line = results.get_u32("line")?;
    Some(Location::new(full_path, relative_path, line))
}

/// `Line 12 of "prog.c" starts at address ...`
pub(crate) fn parse_info_line(text: &str) -> Option<(u32, String)> {
    let start = text.find("Line ")?;
    let rest = &text[start + "Line ".len()..];
    let digits = rest.find(|c: char| !c.is_ascii_digit())?;
    let line = rest[..digits].parse().ok()?;
    let rest = rest[digits..].strip_prefix(" of \"")?;
    let end = rest.find('"')?;
    Some((line, rest[..end].to_string()))
}

/// Find the full path of a source file from `-file-list-exec-source-files`
pub(crate) fn full_path_of(results: &Results, file: &str) -> Option<String> {
    let files = results.get("files")?.values();
    let suffix = format!("/{file}");
    files
        .iter()
        .filter_map(|entry| {
            let name = entry.get_str("file").or_else(|| entry.get_str("filename"))?;
            let fullname = entry.get_str("fullname")?;
            (name == file || fullname == file || fullname.ends_with(&suffix))
                .then(|| fullname.to_string())
        })
        .next()
}

/// Declaration of the function called exactly `name`, from
/// `-symbol-info-functions`
pub(crate) fn function_from(results: &Results, name: &str) -> Option<Location> {
    let debug = results.get("symbols")?.get("debug")?;
    for file in debug.values() {
        let Some(fullname) = file.get_str("fullname") else {
            continue;
        };
        let filename = file.get_str("filename").unwrap_or(fullname);
        let Some(symbols) = file.get("symbols") else {
            continue;
        };
        for symbol in symbols.values() {
            if symbol.get_str("name") == Some(name) {
                if let Some(line) = symbol.get_u32("line") {
                    return Some(Location::new(fullname, filename, line));
                }
            }
        }
    }
    None
}

/// Breakpoints from `-break-list`, one entry per source location
///
/// Entries without a source line (watchpoints, pending breakpoints) are
/// skipped. A location is enabled only if its breakpoint is too.
pub(crate) fn breakpoints_from(results: &Results) -> Vec<BreakpointInfo> {
    let Some(body) = results.get("BreakpointTable").and_then(|t| t.get("body")) else {
        return Vec::new();
    };

    let mut breakpoints = Vec::new();
    for bkpt in body.values() {
        let Some(id) = bkpt.get_str("number").and_then(parent_id) else {
            continue;
        };
        let enabled = bkpt.get_flag("enabled").unwrap_or(true);

        match bkpt.get("locations") {
            Some(locations) => {
                for location in locations.values() {
                    let location_enabled = location.get_flag("enabled").unwrap_or(true);
                    if let Some(info) = breakpoint_at(id, location, enabled && location_enabled) {
                        breakpoints.push(info);
                    }
                }
            }
            None => {
                if let Some(info) = breakpoint_at(id, bkpt, enabled) {
                    breakpoints.push(info);
                }
            }
        }
    }
    breakpoints
}

fn breakpoint_at(id: BreakpointId, value: &Value, enabled: bool) -> Option<BreakpointInfo> {
    let line = value.get_u32("line")?;
    let file = value.get_str("file").or_else(|| value.get_str("fullname"))?;
    let mut info = BreakpointInfo::new(id, file, line, enabled);
    info.full_path = value.get_str("fullname").map(str::to_string);
    Some(info)
}

/// `"3"` and `"3.1"` both belong to breakpoint 3
fn parent_id(number: &str) -> Option<BreakpointId> {
    number.split('.').next()?.parse().ok()
}

/// Escape `name` for use in a GDB regular expression
pub(crate) fn regex_escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use gdbmi::Record;

    use super::*;

    fn results(line: &str) -> Results {
        match Record::parse(line) {
            Record::Result(r) => r.results,
            other => panic!("not a result record: {other:?}"),
        }
    }

    #[test]
    fn info_line() {
        assert_eq!(
            parse_info_line("Line 5 of \"prog.c\" starts at address 0x1139 <main+4> and ends at 0x1141 <main+12>.\n"),
            Some((5, "prog.c".to_string()))
        );
        assert_eq!(
            parse_info_line("Line 3 of \"src/util.c\" is at address 0x1129 <f> but contains no code.\n"),
            Some((3, "src/util.c".to_string()))
        );
        assert_eq!(parse_info_line("Function \"nope\" not defined.\n"), None);
    }

    #[test]
    fn frame_location() {
        let r = results(
            r#"^done,frame={level="0",addr="0x1139",func="main",file="prog.c",fullname="/src/prog.c",line="5",arch="i386:x86-64"}"#,
        );
        let frame = r.get("frame").and_then(Value::as_results).unwrap();
        assert_eq!(
            location_from(frame),
            Some(Location::new("/src/prog.c", "prog.c", 5))
        );
    }

    #[test]
    fn source_files() {
        let r = results(
            r#"^done,files=[{file="prog.c",fullname="/src/prog.c",debug-fully-read="true"},{file="/usr/include/stdio.h",fullname="/usr/include/stdio.h",debug-fully-read="true"},{file="lib/util.c",fullname="/src/lib/util.c",debug-fully-read="false"}]"#,
        );
        assert_eq!(full_path_of(&r, "prog.c").as_deref(), Some("/src/prog.c"));
        assert_eq!(
            full_path_of(&r, "util.c").as_deref(),
            Some("/src/lib/util.c")
        );
        assert_eq!(full_path_of(&r, "missing.c"), None);
    }

    #[test]
    fn function_symbols() {
        let r = results(
            r#"^done,symbols={debug=[{filename="prog.c",fullname="/src/prog.c",symbols=[{line="4",name="main",type="int (void)",description="int main(void);"},{line="20",name="main_loop",type="void (void)",description="void main_loop(void);"}]}]}"#,
        );
        assert_eq!(
            function_from(&r, "main"),
            Some(Location::new("/src/prog.c", "prog.c", 4))
        );
        assert_eq!(function_from(&r, "mai"), None);

        let empty = results(r#"^done,symbols={}"#);
        assert_eq!(function_from(&empty, "main"), None);
    }

    #[test]
    fn break_list() {
        let r = results(
            r#"^done,BreakpointTable={nr_rows="3",nr_cols="6",hdr=[{width="7",alignment="-1",col_name="number",colhdr="Num"}],body=[bkpt={number="1",type="breakpoint",disp="keep",enabled="y",addr="0x1139",func="main",file="prog.c",fullname="/src/prog.c",line="5",thread-groups=["i1"],times="0",original-location="main"},bkpt={number="2",type="breakpoint",disp="keep",enabled="y",addr="<MULTIPLE>",times="0",original-location="inl",locations=[{number="2.1",enabled="y",addr="0x1150",func="inl",file="prog.c",fullname="/src/prog.c",line="12",thread-groups=["i1"]},{number="2.2",enabled="n",addr="0x1190",func="inl",file="prog.c",fullname="/src/prog.c",line="14",thread-groups=["i1"]}]},bkpt={number="3",type="hw watchpoint",disp="keep",enabled="y",addr="",what="counter",times="0"}]}"#,
        );

        let breakpoints = breakpoints_from(&r);
        let summary: Vec<(BreakpointId, u32, bool)> = breakpoints
            .iter()
            .map(|b| (b.id, b.line, b.enabled))
            .collect();
        assert_eq!(summary, vec![(1, 5, true), (2, 12, true), (2, 14, false)]);
        assert!(
            breakpoints
                .iter()
                .all(|b| b.full_path.as_deref() == Some("/src/prog.c"))
        );
    }

    #[test]
    fn disabled_parent_disables_locations() {
        let r = results(
            r#"^done,BreakpointTable={nr_rows="1",nr_cols="6",body=[bkpt={number="4",type="breakpoint",enabled="n",addr="<MULTIPLE>",locations=[{number="4.1",enabled="y",file="a.c",fullname="/a.c",line="1"}]}]}"#,
        );
        assert!(!breakpoints_from(&r)[0].enabled);
    }

    #[test]
    fn escape() {
        assert_eq!(regex_escape("main"), "main");
        assert_eq!(regex_escape("ns::f.x"), r"ns::f\.x");
    }
}
