//! Script preprocessing: comment stripping and the `clr`/`END` bracketing
//! `spec.md` §4.6 describes.

/// Strip `#`/`//` line comments and `/* … */` block comments (which may
/// span lines), blank lines, and leading/trailing whitespace; then, unless
/// `bypass_metadata` (the script is `ped`/`start`/`runTCM`), prepend
/// `clr tstamp`/`clr evcnt`; finally append `END` if the script doesn't
/// already end with one.
pub fn preprocess(raw: &str, bypass_metadata: bool) -> Vec<String> {
    let stripped = strip_block_comments(raw);
    let mut lines: Vec<String> = stripped
        .lines()
        .map(strip_line_comment)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    if !bypass_metadata {
        lines.insert(0, "clr evcnt".to_string());
        lines.insert(0, "clr tstamp".to_string());
    }
    if !lines.iter().any(|l| l.eq_ignore_ascii_case("END")) {
        lines.push("END".to_string());
    }
    lines
}

fn strip_block_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(c2) = chars.next() {
                if c2 == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn strip_line_comment(line: &str) -> &str {
    let cut = [line.find("//"), line.find('#')].into_iter().flatten().min();
    match cut {
        Some(i) => &line[..i],
        None => line,
    }
}

/// True for the script filenames `spec.md` §4.6 names as bypassing
/// run-metadata capture.
pub fn bypasses_run_metadata(script_name: &str) -> bool {
    matches!(script_name, "ped" | "start" | "runTCM")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let raw = "ini # reset\n\nread // poll\n/* block\ncomment */\ndaq 0x100 B\n";
        let lines = preprocess(raw, true);
        assert_eq!(lines, vec!["ini", "read", "daq 0x100 B", "END"]);
    }

    #[test]
    fn prepends_clr_lines_for_non_bypass_scripts() {
        let lines = preprocess("ini\n", false);
        assert_eq!(lines[0], "clr tstamp");
        assert_eq!(lines[1], "clr evcnt");
        assert_eq!(lines[2], "ini");
    }

    #[test]
    fn does_not_duplicate_trailing_end() {
        let lines = preprocess("ini\nEND\n", true);
        assert_eq!(lines, vec!["ini", "END"]);
    }

    #[test]
    fn bypass_filenames_are_recognised() {
        assert!(bypasses_run_metadata("ped"));
        assert!(bypasses_run_metadata("start"));
        assert!(bypasses_run_metadata("runTCM"));
        assert!(!bypasses_run_metadata("myrun"));
    }
}
