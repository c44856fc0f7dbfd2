//! Best-effort `device_type` detection: connect with a generic IOS-like
//! prompt pattern, run each probe command (grouped so the most common
//! command across the table only has to run once), and return the first
//! family whose search patterns match. Mirrors `vendors/autodetect.py`'s
//! `SSHDetect`/`SSH_MAPPER_BASE` one-for-one; this module owns its own
//! minimal `BaseConnection` instead of routing through `Session` because a
//! probe has no vendor family yet.

use crate::base_connection::BaseConnection;
use crate::error::NetsshError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

pub struct AutodetectRule {
    pub device_type: &'static str,
    pub cmd: &'static str,
    pub search_patterns: &'static [&'static str],
    pub priority: u8,
}

lazy_static! {
    pub static ref SSH_MAPPER: Vec<AutodetectRule> = vec![
        AutodetectRule { device_type: "alcatel_aos", cmd: "show system", search_patterns: &["Alcatel-Lucent"], priority: 99 },
        AutodetectRule { device_type: "alcatel_sros", cmd: "show version", search_patterns: &["Nokia", "Alcatel"], priority: 99 },
        AutodetectRule { device_type: "apresia_aeos", cmd: "show system", search_patterns: &["Apresia"], priority: 99 },
        AutodetectRule { device_type: "arista_eos", cmd: "show version", search_patterns: &["Arista"], priority: 99 },
        AutodetectRule { device_type: "ciena_saos", cmd: "software show", search_patterns: &["saos"], priority: 99 },
        AutodetectRule { device_type: "cisco_asa", cmd: "show version", search_patterns: &["Cisco Adaptive Security Appliance", "Cisco ASA"], priority: 99 },
        AutodetectRule { device_type: "cisco_ios", cmd: "show version", search_patterns: &["Cisco IOS Software", "Cisco Internetwork Operating System Software"], priority: 99 },
        AutodetectRule { device_type: "cisco_ios_xe", cmd: "show version", search_patterns: &["Cisco IOS XE Software", "Cisco IOS-XE software", "IOS-XE ROMMON"], priority: 99 },
        AutodetectRule { device_type: "cisco_nxos", cmd: "show version", search_patterns: &["Cisco Nexus Operating System", "NX-OS"], priority: 99 },
        AutodetectRule { device_type: "cisco_ios_xr", cmd: "show version", search_patterns: &["Cisco IOS XR"], priority: 99 },
        AutodetectRule { device_type: "dell_force10", cmd: "show version", search_patterns: &["Real Time Operating System Software"], priority: 99 },
        AutodetectRule { device_type: "dell_os9", cmd: "show system", search_patterns: &["Dell Application Software Version:  9", "Dell Networking OS Version : 9"], priority: 99 },
        AutodetectRule { device_type: "dell_os10", cmd: "show version", search_patterns: &["Dell EMC Networking OS10.Enterprise"], priority: 99 },
        AutodetectRule { device_type: "dell_powerconnect", cmd: "show system", search_patterns: &["PowerConnect"], priority: 99 },
        AutodetectRule { device_type: "f5_tmsh", cmd: "show sys version", search_patterns: &["BIG-IP"], priority: 99 },
        AutodetectRule { device_type: "f5_linux", cmd: "cat /etc/issue", search_patterns: &["BIG-IP"], priority: 99 },
        AutodetectRule { device_type: "hp_comware", cmd: "display version", search_patterns: &["HPE Comware", "HP Comware"], priority: 99 },
        AutodetectRule { device_type: "huawei", cmd: "display version", search_patterns: &["Huawei Technologies", "Huawei Versatile Routing Platform Software"], priority: 99 },
        AutodetectRule { device_type: "juniper_junos", cmd: "show version", search_patterns: &["JUNOS Software Release", "JUNOS .+ Software", "JUNOS OS Kernel", "JUNOS Base Version"], priority: 99 },
        AutodetectRule { device_type: "linux", cmd: "uname -a", search_patterns: &["Linux"], priority: 99 },
        AutodetectRule { device_type: "extreme_exos", cmd: "show version", search_patterns: &["ExtremeXOS"], priority: 99 },
        AutodetectRule { device_type: "extreme_netiron", cmd: "show version", search_patterns: &["(NetIron|MLX)"], priority: 99 },
        AutodetectRule { device_type: "extreme_slx", cmd: "show version", search_patterns: &["SLX-OS Operating System Software"], priority: 99 },
        AutodetectRule { device_type: "extreme_tierra", cmd: "show version", search_patterns: &["TierraOS Software"], priority: 99 },
        AutodetectRule { device_type: "ubiquiti_edgeswitch", cmd: "show version", search_patterns: &["EdgeSwitch"], priority: 99 },
        AutodetectRule { device_type: "cisco_wlc_85", cmd: "show inventory", search_patterns: &["Cisco Wireless Controller"], priority: 99 },
        AutodetectRule { device_type: "mellanox_mlnxos", cmd: "show version", search_patterns: &["Onyx", "SX_PPC_M460EX"], priority: 99 },
        AutodetectRule { device_type: "yamaha", cmd: "show copyright", search_patterns: &["Yamaha Corporation"], priority: 99 },
        AutodetectRule { device_type: "fortinet", cmd: "get system status", search_patterns: &["FortiOS", "FortiGate"], priority: 99 },
        AutodetectRule { device_type: "paloalto_panos", cmd: "show system info", search_patterns: &[r"model:\s+PA"], priority: 99 },
        AutodetectRule { device_type: "supermicro_smis", cmd: "show system info", search_patterns: &["Super Micro Computer"], priority: 99 },
        AutodetectRule { device_type: "flexvnf", cmd: "show system package-info", search_patterns: &["Versa FlexVNF"], priority: 99 },
    ];

    /// The same table, ordered so the most frequently occurring `cmd` across
    /// all rules runs first -- this is what lets the result cache in
    /// `probe` actually save round-trips, since several families share
    /// "show version".
    static ref SSH_MAPPER_ORDERED: Vec<&'static AutodetectRule> = {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for rule in SSH_MAPPER.iter() {
            *counts.entry(rule.cmd).or_insert(0) += 1;
        }
        let mut ordered: Vec<&'static AutodetectRule> = SSH_MAPPER.iter().collect();
        ordered.sort_by_key(|r| std::cmp::Reverse(counts[r.cmd]));
        ordered
    };

    static ref INVALID_RESPONSES: Vec<Regex> = vec![
        Regex::new(r"(?i)% Invalid input detected").unwrap(),
        Regex::new(r"(?i)syntax error, expecting").unwrap(),
        Regex::new(r"(?i)Error: Unrecognized command").unwrap(),
        Regex::new(r"(?i)%Error").unwrap(),
        Regex::new(r"(?i)command not found").unwrap(),
        Regex::new(r"(?i)Syntax Error: unexpected argument").unwrap(),
        Regex::new(r"(?i)% Unrecognized command found at").unwrap(),
    ];
}

/// Probes a device and returns a best-guess `device_type`, or `None` if
/// nothing in the table matched. `cisco_wlc_85` is remapped to `cisco_wlc`
/// on a positive match, same as upstream -- that string is not currently
/// present in the vendor descriptor table, so a caller passing the result
/// straight into `DeviceFactory::create` will get an `UnsupportedDevice`
/// error for that one family (see DESIGN.md).
pub struct SshDetect {
    connection: BaseConnection,
    host: String,
    base_pattern: Regex,
    results_cache: HashMap<&'static str, String>,
}

impl SshDetect {
    pub fn new(
        host: &str,
        username: &str,
        password: Option<&str>,
        port: Option<u16>,
        timeout: Option<Duration>,
    ) -> Result<Self, NetsshError> {
        let mut connection = BaseConnection::new()?;
        connection.connect(host, username, password, port, timeout)?;

        Ok(Self {
            connection,
            host: host.to_string(),
            base_pattern: Regex::new(r"[>#]\s*$").unwrap(),
            results_cache: HashMap::new(),
        })
    }

    fn find_prompt(&mut self) -> Result<String, NetsshError> {
        self.connection.write_channel("\n")?;
        let prompt = self.connection.read_until_pattern(r"[>#]", Some(15.0))?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(NetsshError::PromptError(format!(
                "Host {}: unable to find prompt",
                self.host
            )));
        }
        Ok(prompt.to_string())
    }

    fn set_base_prompt(&mut self) -> Result<(), NetsshError> {
        let prompt = self.find_prompt()?;
        let stem: String = prompt.chars().take(prompt.chars().count().saturating_sub(1)).collect();
        let escaped = regex::escape(&stem);
        self.base_pattern = Regex::new(&format!(r"{}.*?(\(.*?\))?[>#]", escaped))
            .unwrap_or_else(|_| Regex::new(r"[>#]\s*$").unwrap());
        self.connection.base_prompt = Some(stem);
        Ok(())
    }

    fn disable_paging(&mut self) -> Result<(), NetsshError> {
        self.connection.write_channel("terminal length 0\n")?;
        let _ = self.connection.read_until_pattern(self.base_pattern.as_str(), Some(10.0));
        Ok(())
    }

    fn send_probe(&mut self, cmd: &'static str) -> Result<String, NetsshError> {
        if let Some(cached) = self.results_cache.get(cmd) {
            return Ok(cached.clone());
        }
        self.connection.write_channel(&format!("{}\n", cmd))?;
        let output = self
            .connection
            .read_until_pattern(self.base_pattern.as_str(), Some(10.0))
            .unwrap_or_default();
        self.results_cache.insert(cmd, output.clone());
        Ok(output)
    }

    fn autodetect_std(&mut self, rule: &AutodetectRule) -> u8 {
        let Ok(response) = self.send_probe(rule.cmd) else {
            return 0;
        };
        for invalid in INVALID_RESPONSES.iter() {
            if invalid.is_match(&response) {
                return 0;
            }
        }
        for pattern in rule.search_patterns {
            if let Ok(re) = Regex::new(&format!("(?i){}", pattern)) {
                if re.is_match(&response) {
                    return rule.priority;
                }
            }
        }
        0
    }

    pub fn autodetect(&mut self) -> Result<Option<String>, NetsshError> {
        info!("Host {}: probing for device type", self.host);
        self.set_base_prompt()?;
        self.disable_paging()?;

        for rule in SSH_MAPPER_ORDERED.iter() {
            let score = self.autodetect_std(rule);
            if score > 0 {
                debug!(
                    "Host {}: matched {} with priority {}",
                    self.host, rule.device_type, score
                );
                let device_type = if rule.device_type == "cisco_wlc_85" {
                    "cisco_wlc".to_string()
                } else {
                    rule.device_type.to_string()
                };
                let _ = self.connection.close();
                return Ok(Some(device_type));
            }
        }

        let _ = self.connection.close();
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_table_runs_most_common_command_first() {
        let first_cmd = SSH_MAPPER_ORDERED[0].cmd;
        let count = SSH_MAPPER.iter().filter(|r| r.cmd == first_cmd).count();
        assert!(count >= 1);
        assert_eq!(first_cmd, "show version");
    }

    #[test]
    fn invalid_response_list_has_seven_entries() {
        assert_eq!(INVALID_RESPONSES.len(), 7);
    }
}
