use crate::error::NetsshError;
use async_trait::async_trait;
use std::time::Duration;

/// Information gathered about a connected device, returned by
/// `get_device_info`.
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    pub device_type: String,
    pub hostname: String,
    pub version: String,
    pub model: String,
    pub serial: String,
    pub uptime: String,
}

/// Construction parameters for a device connection. Mirrors the keyword
/// arguments accepted by the dispatcher's `create` entry point: most are
/// SSH/transport tuning knobs, a handful are vendor extras consumed only by
/// the families that need them (`secret`, `cmdline_password`,
/// `preempt_privilege`, `delimiter_list`).
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    pub device_type: String,
    pub port: Option<u16>,
    pub timeout: Option<Duration>,
    pub session_log: Option<String>,

    /// Enable/privilege secret (IOS-like, HW1000).
    pub secret: Option<String>,
    /// HP Comware Limited `_cmdline-mode` password.
    pub cmdline_password: Option<String>,
    /// HW1000: force-terminate another active privilege session.
    pub preempt_privilege: bool,

    /// Known-hosts policy: `None` means no verification, matching the
    /// upstream default; a path enables strict checking against that file.
    pub known_hosts: Option<String>,
    pub local_addr: Option<String>,
    pub client_keys: Vec<String>,
    pub passphrase: Option<String>,
    /// An existing connection this one should be tunneled over. Stored as an
    /// opaque handle; seeding/wiring it through the transport layer is not
    /// implemented (see DESIGN.md).
    pub tunnel: Option<std::sync::Arc<()>>,
    /// Override for the vendor's default base-pattern template.
    pub pattern: Option<String>,
    /// Override for the vendor's default delimiter list (used by `terminal`).
    pub delimiter_list: Option<Vec<char>>,
    pub agent_forwarding: bool,
    pub agent_path: Option<String>,
    pub client_version: String,
    pub kex_algs: Vec<String>,
    pub encryption_algs: Vec<String>,
    pub mac_algs: Vec<String>,
    pub compression_algs: Vec<String>,
    pub signature_algs: Vec<String>,
    pub server_host_key_algs: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: None,
            device_type: String::new(),
            port: None,
            timeout: None,
            session_log: None,
            secret: None,
            cmdline_password: None,
            preempt_privilege: false,
            known_hosts: None,
            local_addr: None,
            client_keys: Vec::new(),
            passphrase: None,
            tunnel: None,
            pattern: None,
            delimiter_list: None,
            agent_forwarding: false,
            agent_path: None,
            client_version: String::from("asynchronet"),
            kex_algs: Vec::new(),
            encryption_algs: Vec::new(),
            mac_algs: Vec::new(),
            compression_algs: Vec::new(),
            signature_algs: Vec::new(),
            server_host_key_algs: Vec::new(),
        }
    }
}

/// Builder for `send_command` with a fluent API; mirrors the teacher's
/// `SendCommand` builder one-for-one.
pub struct SendCommand<'a> {
    device: &'a mut dyn NetworkDeviceConnection,
    command: &'a str,
    expect_string: Option<&'a str>,
    read_timeout: Option<f64>,
    auto_find_prompt: Option<bool>,
    strip_prompt: Option<bool>,
    strip_command: Option<bool>,
    normalize: Option<bool>,
    cmd_verify: Option<bool>,
}

impl<'a> SendCommand<'a> {
    pub fn new(device: &'a mut dyn NetworkDeviceConnection, command: &'a str) -> Self {
        Self {
            device,
            command,
            expect_string: None,
            read_timeout: None,
            auto_find_prompt: None,
            strip_prompt: None,
            strip_command: None,
            normalize: None,
            cmd_verify: None,
        }
    }

    pub fn expect_string(mut self, expect: &'a str) -> Self {
        self.expect_string = Some(expect);
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn auto_find_prompt(mut self, auto_find: bool) -> Self {
        self.auto_find_prompt = Some(auto_find);
        self
    }

    pub fn strip_prompt(mut self, strip: bool) -> Self {
        self.strip_prompt = Some(strip);
        self
    }

    pub fn strip_command(mut self, strip: bool) -> Self {
        self.strip_command = Some(strip);
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }

    pub fn cmd_verify(mut self, verify: bool) -> Self {
        self.cmd_verify = Some(verify);
        self
    }

    pub fn execute(self) -> Result<String, NetsshError> {
        self.device.send_command_internal(
            self.command,
            self.expect_string,
            self.read_timeout,
            self.auto_find_prompt,
            self.strip_prompt,
            self.strip_command,
            self.normalize,
            self.cmd_verify,
        )
    }
}

/// Builder for `send_config_set`; mirrors the teacher's `SendConfigSet`.
pub struct SendConfigSet<'a> {
    device: &'a mut dyn NetworkDeviceConnection,
    config_commands: Vec<String>,
    exit_config_mode: Option<bool>,
    read_timeout: Option<f64>,
    strip_prompt: Option<bool>,
    strip_command: Option<bool>,
    config_mode_command: Option<&'a str>,
    cmd_verify: Option<bool>,
    enter_config_mode: Option<bool>,
    with_commit: Option<bool>,
    commit_comment: Option<&'a str>,
}

impl<'a> SendConfigSet<'a> {
    pub fn new(device: &'a mut dyn NetworkDeviceConnection, config_commands: Vec<String>) -> Self {
        Self {
            device,
            config_commands,
            exit_config_mode: None,
            read_timeout: None,
            strip_prompt: None,
            strip_command: None,
            config_mode_command: None,
            cmd_verify: None,
            enter_config_mode: None,
            with_commit: None,
            commit_comment: None,
        }
    }

    pub fn exit_config_mode(mut self, exit: bool) -> Self {
        self.exit_config_mode = Some(exit);
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn strip_prompt(mut self, strip: bool) -> Self {
        self.strip_prompt = Some(strip);
        self
    }

    pub fn strip_command(mut self, strip: bool) -> Self {
        self.strip_command = Some(strip);
        self
    }

    pub fn config_mode_command(mut self, command: &'a str) -> Self {
        self.config_mode_command = Some(command);
        self
    }

    pub fn cmd_verify(mut self, verify: bool) -> Self {
        self.cmd_verify = Some(verify);
        self
    }

    pub fn enter_config_mode(mut self, enter: bool) -> Self {
        self.enter_config_mode = Some(enter);
        self
    }

    /// XR/JunOS only: commit the batch after sending it (default: true for
    /// those families, ignored elsewhere).
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.with_commit = Some(commit);
        self
    }

    pub fn commit_comment(mut self, comment: &'a str) -> Self {
        self.commit_comment = Some(comment);
        self
    }

    pub fn execute(self) -> Result<String, NetsshError> {
        self.device.send_config_set_internal(
            self.config_commands,
            self.exit_config_mode,
            self.read_timeout,
            self.strip_prompt,
            self.strip_command,
            self.config_mode_command,
            self.cmd_verify,
            self.enter_config_mode,
            self.with_commit,
            self.commit_comment,
        )
    }
}

/// The uniform session contract every vendor family is driven through.
/// All methods are synchronous: the `async_trait` annotation exists to keep
/// the calling convention consistent with the rest of the ambient stack, but
/// `BaseConnection`'s "asynchrony" comes from running many Sessions
/// concurrently (one blocking OS thread each), not from intra-session async
/// I/O -- see the concurrency model notes in SPEC_FULL.md.
#[async_trait]
pub trait NetworkDeviceConnection: Send {
    fn connect(&mut self) -> Result<(), NetsshError>;

    fn close(&mut self) -> Result<(), NetsshError>;

    fn send_command<'a>(&'a mut self, command: &'a str) -> SendCommand<'a>
    where
        Self: Sized,
    {
        SendCommand::new(self, command)
    }

    fn send_command_internal(
        &mut self,
        command: &str,
        expect_string: Option<&str>,
        read_timeout: Option<f64>,
        auto_find_prompt: Option<bool>,
        strip_prompt: Option<bool>,
        strip_command: Option<bool>,
        normalize: Option<bool>,
        cmd_verify: Option<bool>,
    ) -> Result<String, NetsshError>;

    fn send_config_set<'a>(&'a mut self, config_commands: Vec<String>) -> SendConfigSet<'a>
    where
        Self: Sized,
    {
        SendConfigSet::new(self, config_commands)
    }

    fn send_config_set_internal(
        &mut self,
        config_commands: Vec<String>,
        exit_config_mode: Option<bool>,
        read_timeout: Option<f64>,
        strip_prompt: Option<bool>,
        strip_command: Option<bool>,
        config_mode_command: Option<&str>,
        cmd_verify: Option<bool>,
        enter_config_mode: Option<bool>,
        with_commit: Option<bool>,
        commit_comment: Option<&str>,
    ) -> Result<String, NetsshError>;

    fn get_device_info(&mut self) -> Result<DeviceInfo, NetsshError>;

    fn get_device_type(&self) -> &str;

    fn check_config_mode(&mut self) -> Result<bool, NetsshError>;

    fn enter_config_mode(&mut self, config_command: Option<&str>) -> Result<(), NetsshError>;

    fn exit_config_mode(&mut self, exit_command: Option<&str>) -> Result<(), NetsshError>;

    fn session_preparation(&mut self) -> Result<(), NetsshError>;

    fn terminal_settings(&mut self) -> Result<(), NetsshError>;

    fn set_terminal_width(&mut self, width: u32) -> Result<(), NetsshError>;

    fn disable_paging(&mut self) -> Result<(), NetsshError>;

    fn set_base_prompt(&mut self) -> Result<String, NetsshError>;

    fn save_configuration(&mut self) -> Result<(), NetsshError>;
}
