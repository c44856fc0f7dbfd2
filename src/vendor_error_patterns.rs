//! Per-vendor-family command-error detection. Kept separate from the prompt
//! engine so new error signatures can be added without touching connection
//! logic, the way the teacher keeps its error pattern tables in their own
//! module, generalized here from 5 device types to the full descriptor set.

use crate::error::NetsshError;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    pub static ref CISCO_IOS_ERRORS: Vec<Regex> = vec![
        Regex::new(r"% (?:Invalid|Incomplete|Ambiguous) (?:input|command)").unwrap(),
        Regex::new(r"% Error in authentication").unwrap(),
        Regex::new(r"% Bad passwords").unwrap(),
        Regex::new(r"% Unknown command").unwrap(),
        Regex::new(r"% Unrecognized command").unwrap(),
        Regex::new(r"% (?:Error|Not) (?:opening|possible)").unwrap(),
    ];

    pub static ref CISCO_XR_ERRORS: Vec<Regex> = vec![
        Regex::new(r"% (?:Invalid|Incomplete|Ambiguous) (?:input|command)").unwrap(),
        Regex::new(r"% No matching").unwrap(),
        Regex::new(r"% Error in authentication").unwrap(),
        Regex::new(r"% Not allowed").unwrap(),
        Regex::new(r"error: .*").unwrap(),
    ];

    pub static ref CISCO_NXOS_ERRORS: Vec<Regex> = vec![
        Regex::new(r"% (?:Invalid|Incomplete|Ambiguous) (?:input|command)").unwrap(),
        Regex::new(r"% No matching").unwrap(),
        Regex::new(r"% Permission denied").unwrap(),
        Regex::new(r"% Error: ").unwrap(),
        Regex::new(r"ERROR: ").unwrap(),
        Regex::new(r"\^\s*\r?\n% Invalid parameter detected at '\^' marker\.").unwrap(),
        Regex::new(r"% Invalid parameter detected at '\^' marker\.").unwrap(),
    ];

    pub static ref CISCO_ASA_ERRORS: Vec<Regex> = vec![
        Regex::new(r"% (?:Invalid|Incomplete|Ambiguous) (?:input|command)").unwrap(),
        Regex::new(r"ERROR: ").unwrap(),
        Regex::new(r"% Error ").unwrap(),
        Regex::new(r"% Bad (?:password|secret)").unwrap(),
        Regex::new(r"% No such").unwrap(),
    ];

    pub static ref JUNIPER_JUNOS_ERRORS: Vec<Regex> = vec![
        Regex::new(r"(?:error|warning):").unwrap(),
        Regex::new(r"syntax error").unwrap(),
        Regex::new(r"syntax error, expecting").unwrap(),
        Regex::new(r"unknown command").unwrap(),
        Regex::new(r"invalid (?:command|input)").unwrap(),
        Regex::new(r"commit failed").unwrap(),
        Regex::new(r"configuration check-out failed").unwrap(),
        Regex::new(r"\^\s*\r?\n").unwrap(),
        Regex::new(r"command is not valid").unwrap(),
        Regex::new(r"is ambiguous").unwrap(),
    ];

    pub static ref COMWARE_ERRORS: Vec<Regex> = vec![
        Regex::new(r"% Unrecognized command").unwrap(),
        Regex::new(r"% Wrong parameter").unwrap(),
        Regex::new(r"% Too many parameters").unwrap(),
        Regex::new(r"% Ambiguous command").unwrap(),
        Regex::new(r"% Incomplete command").unwrap(),
    ];

    pub static ref MIKROTIK_ERRORS: Vec<Regex> = vec![
        Regex::new(r"(?i)no such command").unwrap(),
        Regex::new(r"(?i)syntax error").unwrap(),
        Regex::new(r"(?i)bad command name").unwrap(),
        Regex::new(r"(?i)expected end of command").unwrap(),
    ];

    pub static ref ARUBA_ERRORS: Vec<Regex> = vec![
        Regex::new(r"(?i)invalid input").unwrap(),
        Regex::new(r"(?i)unrecognized command").unwrap(),
        Regex::new(r"(?i)incomplete command").unwrap(),
        Regex::new(r"(?i)ambiguous command").unwrap(),
    ];

    pub static ref ALCATEL_ERRORS: Vec<Regex> = vec![
        Regex::new(r"(?i)ERROR:").unwrap(),
        Regex::new(r"(?i)invalid entry").unwrap(),
    ];

    pub static ref GENERIC_ERRORS: Vec<Regex> = vec![
        Regex::new(r"(?i)% ?invalid (?:input|command)").unwrap(),
        Regex::new(r"(?i)syntax error").unwrap(),
        Regex::new(r"(?i)unknown command").unwrap(),
        Regex::new(r"(?i)unrecognized command").unwrap(),
    ];
}

/// Returns the error patterns for the given `device_type` string (as
/// returned by the descriptor table's `name` field). Families that share a
/// CLI dialect share a pattern table; anything not explicitly listed falls
/// back to [`GENERIC_ERRORS`].
pub fn get_error_patterns(device_type: &str) -> &'static Vec<Regex> {
    match device_type {
        "cisco_ios" | "cisco_ios_xe" | "cisco_sg3xx" | "arista_eos" | "fujitsu_switch"
        | "ubiquity_edge" | "hw1000" => &CISCO_IOS_ERRORS,
        "cisco_ios_xr" => &CISCO_XR_ERRORS,
        "cisco_nxos" => &CISCO_NXOS_ERRORS,
        "cisco_asa" => &CISCO_ASA_ERRORS,
        "juniper_junos" => &JUNIPER_JUNOS_ERRORS,
        "hp_comware" | "hp_comware_limited" | "huawei" => &COMWARE_ERRORS,
        "mikrotik_routeros" => &MIKROTIK_ERRORS,
        "aruba_aos_6" | "aruba_aos_8" => &ARUBA_ERRORS,
        "alcatel_aos" => &ALCATEL_ERRORS,
        _ => &GENERIC_ERRORS,
    }
}

/// Checks if the output matches any error pattern for the specified device type
pub fn check_for_errors(output: &str, device_type: &str) -> Option<String> {
    debug!("Checking for errors in output for device type: {}", device_type);

    let patterns = get_error_patterns(device_type);
    for pattern in patterns.iter() {
        if let Some(captures) = pattern.captures(output) {
            if let Some(matched) = captures.get(0) {
                let error = matched.as_str().to_string();
                debug!("Found error pattern match: {}", error);
                return Some(error);
            }
        }
    }

    None
}

/// Checks command output against device-specific error patterns and converts matches to NetsshError
pub fn check_command_output(output: &str, device_type: &str) -> Result<(), NetsshError> {
    if let Some(error_match) = check_for_errors(output, device_type) {
        Err(NetsshError::command_error_with_output(
            error_match,
            output.to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ios_invalid_input() {
        let out = "% Invalid input detected at '^' marker.";
        assert!(check_for_errors(out, "cisco_ios").is_some());
    }

    #[test]
    fn detects_junos_commit_failure() {
        assert!(check_for_errors("commit failed", "juniper_junos").is_some());
    }

    #[test]
    fn unknown_family_falls_back_to_generic() {
        assert!(check_for_errors("syntax error", "some_future_vendor").is_some());
    }

    #[test]
    fn clean_output_has_no_match() {
        assert!(check_for_errors("interface GigabitEthernet0/1 is up", "cisco_ios").is_none());
    }
}
