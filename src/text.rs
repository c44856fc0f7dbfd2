//! Pure text transforms applied to raw device output: ANSI stripping,
//! line-feed normalization, and echo/prompt cleanup. Kept free of any I/O so
//! they can be exercised directly against fixture strings.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CRLF_PATTERN: Regex = Regex::new(r"(\r\r\n|\r\n|\n\r)").unwrap();
    static ref ANSI_ESCAPE_CODES: Vec<Regex> = vec![
        Regex::new(r"\x1B\[\d+;\d+;\d+m").unwrap(),
        Regex::new(r"\x1B\[m").unwrap(),
        Regex::new(r"\x1B\[\d+;\d+r").unwrap(),
        Regex::new(r"\x1B\[\d+;\d+H").unwrap(),
        Regex::new(r"\x1B\[\?\d+h").unwrap(),
        Regex::new(r"\x1B\[\?\d+l").unwrap(),
        Regex::new(r"\x1B\[\d+A").unwrap(),
        Regex::new(r"\x1B\[\d+B").unwrap(),
        Regex::new(r"\x1B\[\d+C").unwrap(),
        Regex::new(r"\x1B\[\d+D").unwrap(),
        Regex::new(r"\x1B\[1;24r").unwrap(),
        Regex::new(r"\x1B\[24;1H").unwrap(),
        Regex::new(r"\x1B\[K").unwrap(),
        Regex::new(r"\x1B\[2K").unwrap(),
        Regex::new(r"\x1B\[\d+;\d+f").unwrap(),
        Regex::new(r"\x1B7").unwrap(),
        Regex::new(r"\x1B8").unwrap(),
    ];
    static ref ANSI_NEXT_LINE: Regex = Regex::new(r"\x1BE").unwrap();
}

/// Replaces the line-ending variants a device may send with a plain `\n`.
/// NX-OS and Fujitsu additionally call [`collapse_nxos_cr`] /
/// [`collapse_doubled_newlines`] on top of this.
pub fn normalize_linefeeds(data: &str) -> String {
    CRLF_PATTERN.replace_all(data, "\n").to_string()
}

/// NX-OS quirk: drop any remaining bare `\r` left after CRLF normalization.
pub fn collapse_nxos_cr(data: &str) -> String {
    data.replace('\r', "")
}

/// Fujitsu quirk: collapse doubled blank lines the switch inserts between
/// prompt redraws.
pub fn collapse_doubled_newlines(data: &str) -> String {
    data.replace("\n\n", "\n")
}

pub fn strip_ansi(data: &str) -> String {
    let mut out = ANSI_NEXT_LINE.replace_all(data, "\n").to_string();
    for pattern in ANSI_ESCAPE_CODES.iter() {
        out = pattern.replace_all(&out, "").to_string();
    }
    out
}

/// If the raw output contains backspace-driven echo/wrap artifacts, strip the
/// backspaces and discard the artifact-bearing first line.
pub fn collapse_backspace_echo(data: &str) -> String {
    if !data.contains('\x08') {
        return data.to_string();
    }
    let cleaned: String = data.chars().filter(|&c| c != '\x08').collect();
    match cleaned.split_once('\n') {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    }
}

/// Drops the command echo from the first line, assuming no backspaces were
/// present (backspace-laden echoes are handled by [`collapse_backspace_echo`]
/// before this runs).
pub fn strip_command_echo(data: &str, command: &str) -> String {
    if let Some(stripped) = data.strip_prefix(command) {
        stripped.to_string()
    } else {
        data.to_string()
    }
}

/// Drops the final line if it contains `base_prompt` as a substring.
pub fn strip_prompt_line(data: &str, base_prompt: &str) -> String {
    if base_prompt.is_empty() {
        return data.to_string();
    }
    match data.rfind('\n') {
        Some(idx) => {
            let (head, tail) = data.split_at(idx);
            let last_line = &tail[1..];
            if last_line.contains(base_prompt) {
                head.to_string()
            } else {
                data.to_string()
            }
        }
        None => {
            if data.contains(base_prompt) {
                String::new()
            } else {
                data.to_string()
            }
        }
    }
}

/// Runs the fixed cleanup pipeline: ANSI strip -> linefeed normalize ->
/// per-family linefeed override -> optional prompt strip -> optional command
/// strip.
pub fn sanitize_output(
    raw: &str,
    command: &str,
    base_prompt: &str,
    ansi_escape_codes: bool,
    strip_prompt: bool,
    strip_command: bool,
    device_type: &str,
) -> String {
    let mut out = if ansi_escape_codes {
        strip_ansi(raw)
    } else {
        raw.to_string()
    };
    out = normalize_linefeeds(&out);
    out = match device_type {
        "cisco_nxos" => collapse_nxos_cr(&out),
        "fujitsu_switch" => collapse_doubled_newlines(&out),
        _ => out,
    };
    if strip_prompt {
        out = strip_prompt_line(&out, base_prompt);
    }
    if strip_command {
        out = collapse_backspace_echo(&out);
        out = strip_command_echo(&out, command);
    }
    out.trim_start_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_all_linefeed_variants() {
        assert_eq!(normalize_linefeeds("a\r\nb\r\r\nc\n\rd"), "a\nb\nc\nd");
    }

    #[test]
    fn ansi_strip_is_idempotent() {
        let raw = "\x1B[2Kshow version\x1B[1;24r\n";
        let once = strip_ansi(raw);
        let twice = strip_ansi(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn strips_trailing_prompt_line() {
        let data = "Line one\nLine two\nR1#";
        assert_eq!(strip_prompt_line(data, "R1"), "Line one\nLine two");
    }

    #[test]
    fn leaves_output_untouched_when_prompt_absent() {
        let data = "Line one\nLine two";
        assert_eq!(strip_prompt_line(data, "R1"), data);
    }

    #[test]
    fn strips_command_echo_prefix() {
        assert_eq!(strip_command_echo("show ver\r\noutput", "show ver"), "\r\noutput");
    }

    #[test]
    fn nxos_sanitize_collapses_residual_cr() {
        let raw = "show ver\r\n\rinterface Eth1\r\n";
        let out = sanitize_output(raw, "show ver", "", false, false, false, "cisco_nxos");
        assert!(!out.contains('\r'));
    }

    #[test]
    fn fujitsu_sanitize_collapses_doubled_newlines() {
        let raw = "line one\n\nline two\n";
        let out = sanitize_output(raw, "", "", false, false, false, "fujitsu_switch");
        assert_eq!(out, "line one\nline two\n");
    }

    #[test]
    fn other_devices_keep_doubled_newlines() {
        let raw = "line one\n\nline two\n";
        let out = sanitize_output(raw, "", "", false, false, false, "cisco_ios");
        assert_eq!(out, raw);
    }
}
