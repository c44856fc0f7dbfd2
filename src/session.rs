//! The per-vendor session engine: owns a `BaseConnection` plus the
//! descriptor for whichever of the 19 supported families this session was
//! opened against, and drives connect/prompt-discovery/mode-transition
//! behavior generically off that descriptor instead of one hand-written
//! wrapper type per vendor (compare `vendors/cisco/ciscodevicebase.rs`,
//! whose `CiscoBaseConnection` this generalizes).

use crate::base_connection::BaseConnection;
use crate::device_connection::{DeviceConfig, DeviceInfo, NetworkDeviceConnection};
use crate::error::NetsshError;
use crate::text;
use crate::vendor::{self, extract_stem, ModeFamily, VendorDescriptor};
use crate::vendor_error_patterns;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

pub struct Session {
    connection: BaseConnection,
    config: DeviceConfig,
    descriptor: &'static VendorDescriptor,
    device_type: String,
    prompt_pattern_source: String,
    in_enable_mode: bool,
    in_config_mode: bool,
    in_shell_mode: bool,
    multiple_mode: bool,
}

impl Session {
    pub fn new(config: DeviceConfig) -> Result<Self, NetsshError> {
        let descriptor = vendor::descriptor(&config.device_type).ok_or_else(|| {
            NetsshError::UnsupportedDevice(format!(
                "Unsupported device type '{}'. Supported types: {:?}",
                config.device_type,
                vendor::supported_device_types()
            ))
        })?;

        let mut connection = BaseConnection::new()?;
        if let Some(secs) = config.timeout {
            connection.config.connection_timeout = secs;
        }
        if let Some(path) = &config.session_log {
            connection.session_log.enable(path)?;
        }
        connection.set_delimiters_and_pattern(descriptor);

        Ok(Self {
            connection,
            device_type: config.device_type.clone(),
            descriptor,
            config,
            prompt_pattern_source: String::new(),
            in_enable_mode: false,
            in_config_mode: false,
            in_shell_mode: false,
            multiple_mode: false,
        })
    }

    /// ASA only: whether `show mode` reported this context runs in multiple
    /// (virtual-firewall) mode. Populated during `session_preparation`.
    pub fn multiple_mode(&self) -> bool {
        self.multiple_mode
    }

    /// HW1000 only: whether the session currently sits in the Linux shell
    /// entered via [`Session::enter_shell_mode`].
    pub fn in_shell_mode(&self) -> bool {
        self.in_shell_mode
    }

    fn terminator(&self) -> &'static str {
        self.descriptor.command_terminator
    }

    fn write_line(&mut self, line: &str) -> Result<(), NetsshError> {
        self.connection
            .write_channel(&format!("{}{}", line, self.terminator()))
    }

    /// Discovers the raw prompt line by nudging the device with a blank
    /// line and reading whatever comes back; relies on `SSHChannel`'s
    /// delimiter-aware early exit, seeded from the descriptor in `new`.
    fn find_prompt(&mut self) -> Result<String, NetsshError> {
        self.write_line("")?;
        let mut prompt = self.connection.read_channel()?.trim().to_string();

        let mut attempt = 0;
        while prompt.is_empty() && attempt < 12 {
            self.write_line("")?;
            std::thread::sleep(std::time::Duration::from_millis(250));
            prompt = self.connection.read_channel()?.trim().to_string();
            attempt += 1;
        }

        if prompt.is_empty() {
            return Err(NetsshError::PromptError("Unable to find prompt".to_string()));
        }

        let last_line = prompt.lines().last().unwrap_or(&prompt).to_string();
        Ok(last_line)
    }

    fn do_set_base_prompt(&mut self) -> Result<String, NetsshError> {
        let raw = self.find_prompt()?;
        let raw = raw.trim();

        if !raw
            .chars()
            .last()
            .map(|c| self.descriptor.delimiter_list.contains(&c))
            .unwrap_or(false)
        {
            return Err(NetsshError::PromptError(format!(
                "Router prompt not found: {}",
                raw
            )));
        }

        let stem = extract_stem(self.descriptor.stem_rule, raw);
        let pattern_source = self.descriptor.base_pattern_source(&stem);
        let pattern = Regex::new(&pattern_source)
            .map_err(|e| NetsshError::PatternError(format!("Invalid base pattern: {}", e)))?;

        self.connection.channel.set_base_prompt(&stem, pattern);
        self.connection.base_prompt = Some(stem.clone());
        self.prompt_pattern_source = pattern_source;

        Ok(stem)
    }

    fn read_until_prompt(&mut self, timeout: Option<f64>) -> Result<String, NetsshError> {
        let pattern = if self.prompt_pattern_source.is_empty() {
            return Err(NetsshError::ConnectionError(
                "Base prompt not set".to_string(),
            ));
        } else {
            self.prompt_pattern_source.clone()
        };
        self.connection.read_until_pattern(&pattern, timeout)
    }

    /// Reads until either `pattern` or the base prompt matches, whichever
    /// comes first -- the primitive interactive sub-prompts and commit
    /// confirmations are built on.
    fn read_until_prompt_or_pattern(
        &mut self,
        pattern: &str,
        timeout: Option<f64>,
    ) -> Result<String, NetsshError> {
        if pattern.is_empty() {
            return self.read_until_prompt(timeout);
        }
        if self.prompt_pattern_source.is_empty() {
            return self.connection.read_until_pattern(pattern, timeout);
        }
        let combined = format!("(?:{})|(?:{})", pattern, self.prompt_pattern_source);
        self.connection.read_until_pattern(&combined, timeout)
    }

    fn do_check_enable_mode(&mut self) -> Result<bool, NetsshError> {
        let Some(check) = self.descriptor.priv_check else {
            return Ok(true);
        };
        self.write_line("")?;
        std::thread::sleep(std::time::Duration::from_millis(300));
        let output = self.connection.read_channel().unwrap_or_default();
        let is_priv = output.lines().any(|l| l.trim().ends_with(check));
        self.in_enable_mode = is_priv;
        Ok(is_priv)
    }

    fn do_enable_mode(&mut self) -> Result<(), NetsshError> {
        let Some(enter) = self.descriptor.priv_enter else {
            return Ok(());
        };
        if self.do_check_enable_mode()? {
            return Ok(());
        }

        self.write_line(enter)?;

        if let Some(secret) = self.config.secret.clone() {
            let output = self.connection.read_until_pattern("(?i)password", Some(10.0))?;
            if Regex::new("(?i)password").unwrap().is_match(&output) {
                self.write_line(&secret)?;
            }
        }

        if self.descriptor.mode_family == ModeFamily::Hw1000 && self.config.preempt_privilege {
            let output = self.connection.read_channel().unwrap_or_default();
            if output.to_lowercase().contains("terminate") {
                self.write_line("y")?;
            }
        }

        let check = self.descriptor.priv_check.unwrap_or("#");
        let output = self.connection.read_until_pattern(&regex::escape(check), Some(10.0))?;
        if !output.trim_end().ends_with(check) {
            return Err(NetsshError::CommandError(
                "Failed to enter privileged mode".to_string(),
            ));
        }
        self.in_enable_mode = true;
        Ok(())
    }

    fn do_exit_enable_mode(&mut self) -> Result<(), NetsshError> {
        let Some(exit) = self.descriptor.priv_exit else {
            return Ok(());
        };
        if !self.do_check_enable_mode()? {
            return Ok(());
        }
        self.write_line(exit)?;
        let _ = self.connection.read_until_pattern(
            &format!("[{}]", regex::escape(&self.descriptor.delimiter_list.iter().collect::<String>())),
            Some(10.0),
        );
        self.in_enable_mode = false;
        Ok(())
    }

    fn do_check_config_mode(&mut self) -> Result<bool, NetsshError> {
        let Some(check) = self.descriptor.config_check else {
            return Ok(self.in_config_mode);
        };
        self.write_line("")?;
        std::thread::sleep(std::time::Duration::from_millis(300));
        let output = self.connection.read_channel().unwrap_or_default();
        let is_config = output.lines().any(|l| l.contains(check));
        self.in_config_mode = is_config;
        Ok(is_config)
    }

    fn hp_comware_limited_handshake(&mut self) -> Result<(), NetsshError> {
        let Some(password) = self.config.cmdline_password.clone() else {
            return Ok(());
        };

        self.write_line("_cmdline-mode on")?;
        let confirm = self.connection.read_until_pattern(r"\[Y/N\]", Some(10.0))?;
        if Regex::new(r"\[Y/N\]").unwrap().is_match(&confirm) {
            self.write_line("Y")?;
        }

        let prompt = self.connection.read_until_pattern("(?i)password", Some(10.0))?;
        if Regex::new("(?i)password").unwrap().is_match(&prompt) {
            self.write_line(&password)?;
        }

        let response = self.connection.read_channel().unwrap_or_default();
        if response.to_lowercase().contains("invalid password") {
            return Err(NetsshError::CommandError(
                "HP Comware Limited cmdline-mode password rejected".to_string(),
            ));
        }
        Ok(())
    }

    /// JunOS quirk: a freshly connected session can drop into a csh shell
    /// (`%` prompt) instead of the operational CLI. Detect it and issue
    /// `cli` before prompt discovery proceeds.
    fn junos_enter_cli_if_csh(&mut self) -> Result<(), NetsshError> {
        if self.descriptor.mode_family != ModeFamily::JunosLike {
            return Ok(());
        }
        self.write_line("")?;
        std::thread::sleep(std::time::Duration::from_millis(200));
        let output = self.connection.read_channel().unwrap_or_default();
        if output.trim_end().ends_with('%') {
            self.write_line("cli")?;
            let _ = self.connection.read_until_pattern(">", Some(10.0));
        }
        Ok(())
    }

    /// ASA: after enable, ask the firewall whether it runs in multiple
    /// (virtual-context) mode and record the answer for callers.
    fn detect_asa_multiple_mode(&mut self) -> Result<(), NetsshError> {
        let output = self.do_send_command(
            "show mode",
            None,
            Some(10.0),
            Some(false),
            Some(true),
            Some(true),
            Some(true),
            Some(false),
        )?;
        self.multiple_mode = output.to_lowercase().contains("multiple");
        Ok(())
    }

    /// HW1000: drop from privileged mode into the Linux shell. Requires
    /// `preempt_privilege`-style confirmation handling already satisfied by
    /// `do_enable_mode`; the prompt character set changes once inside the
    /// shell, so the base prompt must be rediscovered afterward.
    pub fn enter_shell_mode(&mut self) -> Result<(), NetsshError> {
        if self.descriptor.mode_family != ModeFamily::Hw1000 || self.in_shell_mode {
            return Ok(());
        }

        self.write_line("admin esc")?;
        let confirm = self
            .connection
            .read_until_pattern("(?i)yes", Some(10.0))
            .unwrap_or_default();
        if confirm.to_lowercase().contains("yes") {
            self.write_line("Yes")?;
        }

        if let Some(secret) = self.config.secret.clone() {
            let _ = self.connection.read_until_pattern("(?i)password", Some(10.0));
            self.write_line(&secret)?;
        }

        let output = self.connection.read_until_pattern(r"[>#]", Some(10.0))?;
        if !output.trim_end().ends_with('>') && !output.trim_end().ends_with('#') {
            return Err(NetsshError::CommandError(
                "Failed to enter HW1000 shell mode".to_string(),
            ));
        }

        self.in_shell_mode = true;
        self.do_set_base_prompt()?;
        Ok(())
    }

    /// HW1000: returns from the Linux shell to privileged mode, rediscovering
    /// the base prompt. Called automatically from `close()` before the
    /// session exits enable mode.
    pub fn exit_shell_mode(&mut self) -> Result<(), NetsshError> {
        if !self.in_shell_mode {
            return Ok(());
        }
        self.write_line("exit")?;
        let _ = self.read_until_prompt(Some(10.0));
        self.in_shell_mode = false;
        self.do_set_base_prompt()?;
        Ok(())
    }

    fn do_config_mode(&mut self, config_command: Option<&str>) -> Result<(), NetsshError> {
        let Some(default_enter) = self.descriptor.config_enter else {
            return Ok(());
        };
        if self.do_check_config_mode()? {
            return Ok(());
        }
        if self.descriptor.priv_enter.is_some() && !self.do_check_enable_mode()? {
            self.do_enable_mode()?;
        }
        if self.descriptor.mode_family == ModeFamily::HpComwareLimited {
            self.hp_comware_limited_handshake()?;
        }

        let cmd = config_command.unwrap_or(default_enter);
        self.write_line(cmd)?;

        let check = self.descriptor.config_check.unwrap_or("");
        let output = self
            .connection
            .read_until_pattern(&regex::escape(check), Some(10.0))?;
        if !output.contains(check) {
            return Err(NetsshError::CommandError(
                "Failed to enter config mode".to_string(),
            ));
        }
        self.in_config_mode = true;
        Ok(())
    }

    fn do_exit_config_mode(&mut self, exit_command: Option<&str>) -> Result<(), NetsshError> {
        let Some(default_exit) = self.descriptor.config_exit else {
            return Ok(());
        };
        if !self.do_check_config_mode()? {
            return Ok(());
        }
        let cmd = exit_command.unwrap_or(default_exit);
        self.write_line(cmd)?;

        if self.descriptor.mode_family == ModeFamily::Xr {
            let output = self
                .read_until_prompt_or_pattern("Uncommitted changes found", Some(10.0))
                .unwrap_or_default();
            if output.contains("Uncommitted changes found") {
                self.write_line("no")?;
                let _ = self.read_until_prompt(Some(10.0));
            }
        } else {
            let _ = self.read_until_prompt(Some(10.0));
        }

        self.in_config_mode = false;
        Ok(())
    }

    /// XR's two-phase commit: send the batch, `commit`, and read until the
    /// prompt returns or the device asks whether to proceed anyway. A
    /// `Failed to commit` body raises `CommitError` carrying
    /// `show configuration failed`'s output. A `One or more commits have
    /// occurred` conflict declines the commit (`no`) and raises `CommitError`
    /// carrying `show configuration commit changes`'s output.
    fn commit_xr(&mut self, comment: Option<&str>) -> Result<String, NetsshError> {
        let commit_cmd = match comment {
            Some(c) => format!("commit comment \"{}\"", c),
            None => "commit".to_string(),
        };
        self.write_line(&commit_cmd)?;
        let output = self.read_until_prompt_or_pattern(
            "Do you wish to proceed with this commit anyway\\?",
            Some(30.0),
        )?;

        if output.contains("Failed to commit") {
            self.write_line("show configuration failed")?;
            let failed = self.read_until_prompt(Some(15.0)).unwrap_or_default();
            return Err(NetsshError::commit_failed(self.config.host.clone(), failed));
        }

        if output.contains("One or more commits have occurred") {
            self.write_line("no")?;
            let _ = self.read_until_prompt(Some(10.0));
            self.write_line("show configuration commit changes")?;
            let changes = self.read_until_prompt(Some(15.0)).unwrap_or_default();
            return Err(NetsshError::commit_failed(self.config.host.clone(), changes));
        }

        Ok(output)
    }

    fn send_config_set_generic(
        &mut self,
        commands: &[String],
        exit_config_mode: bool,
        config_mode_command: Option<&str>,
        strip_prompt: bool,
        strip_command: bool,
    ) -> Result<String, NetsshError> {
        let mut output = String::new();

        if self.descriptor.config_enter.is_some() {
            self.do_config_mode(config_mode_command)?;
        }

        for cmd in commands {
            let result = self.do_send_command(cmd, None, None, Some(false), Some(strip_prompt), Some(strip_command), Some(true), Some(true))?;
            output.push_str(&result);
            output.push('\n');
        }

        if exit_config_mode && self.descriptor.config_exit.is_some() {
            self.do_exit_config_mode(None)?;
        }

        Ok(output)
    }

    fn send_config_set_junos_like(
        &mut self,
        commands: &[String],
        exit_config_mode: bool,
        with_commit: bool,
        commit_comment: Option<&str>,
    ) -> Result<String, NetsshError> {
        let mut output = String::new();
        self.do_config_mode(None)?;

        for cmd in commands {
            let result = self.do_send_command(cmd, None, None, Some(false), Some(false), Some(true), Some(true), Some(true))?;
            output.push_str(&result);
            output.push('\n');
        }

        if with_commit {
            let commit_cmd = match commit_comment {
                Some(c) => format!("commit comment \"{}\"", c),
                None => "commit".to_string(),
            };
            self.write_line(&commit_cmd)?;
            let commit_output = self.read_until_prompt(Some(30.0))?;
            if commit_output.to_lowercase().contains("commit failed") {
                return Err(NetsshError::commit_failed(
                    self.config.host.clone(),
                    commit_output,
                ));
            }
            output.push_str(&commit_output);
        }

        if exit_config_mode {
            self.do_exit_config_mode(None)?;
        }

        Ok(output)
    }

    fn send_config_set_xr(
        &mut self,
        commands: &[String],
        exit_config_mode: bool,
        with_commit: bool,
        commit_comment: Option<&str>,
    ) -> Result<String, NetsshError> {
        let mut output = String::new();
        self.do_config_mode(None)?;

        for cmd in commands {
            let result = self.do_send_command(cmd, None, None, Some(false), Some(false), Some(true), Some(true), Some(true))?;
            output.push_str(&result);
            output.push('\n');
        }

        if with_commit {
            output.push_str(&self.commit_xr(commit_comment)?);
        }

        if exit_config_mode {
            self.do_exit_config_mode(None)?;
        }

        Ok(output)
    }

    fn do_send_command(
        &mut self,
        command: &str,
        expect_string: Option<&str>,
        read_timeout: Option<f64>,
        auto_find_prompt: Option<bool>,
        strip_prompt: Option<bool>,
        strip_command: Option<bool>,
        normalize: Option<bool>,
        cmd_verify: Option<bool>,
    ) -> Result<String, NetsshError> {
        let read_timeout = read_timeout.unwrap_or(10.0);
        let strip_prompt = strip_prompt.unwrap_or(true);
        let strip_command = strip_command.unwrap_or(true);
        let normalize = normalize.unwrap_or(true);
        let cmd_verify = cmd_verify.unwrap_or(true);
        let auto_find_prompt = auto_find_prompt.unwrap_or(false);

        debug!("Sending command: {}", command);

        if auto_find_prompt {
            self.do_set_base_prompt()?;
        } else if expect_string.is_none() && self.prompt_pattern_source.is_empty() {
            return Err(NetsshError::PromptError("No base prompt set".to_string()));
        }

        let cmd = if normalize {
            format!("{}{}", command.trim(), self.terminator())
        } else {
            command.to_string()
        };
        self.connection.write_channel(&cmd)?;

        if cmd_verify {
            let escaped = regex::escape(command.trim());
            let _ = self.connection.read_until_pattern(&escaped, Some(read_timeout));
        }

        // When a caller supplies `expect_string` (interactive sub-prompts),
        // read until that pattern OR the base prompt, so a command that
        // returns straight to the prompt without ever emitting the expected
        // text still terminates instead of timing out.
        let raw_output = match expect_string {
            Some(p) => self.read_until_prompt_or_pattern(p, Some(read_timeout))?,
            None => self.connection.read_until_pattern(&self.prompt_pattern_source.clone(), Some(read_timeout))?,
        };

        let base_prompt = self.connection.base_prompt.clone().unwrap_or_default();
        let sanitized = text::sanitize_output(
            &raw_output,
            command,
            &base_prompt,
            false,
            strip_prompt,
            strip_command,
            &self.device_type,
        );

        vendor_error_patterns::check_command_output(&sanitized, &self.device_type)?;
        Ok(sanitized)
    }
}

#[async_trait]
impl NetworkDeviceConnection for Session {
    fn connect(&mut self) -> Result<(), NetsshError> {
        self.connection.connect(
            &self.config.host,
            &self.config.username,
            self.config.password.as_deref(),
            self.config.port,
            self.config.timeout,
        )?;
        self.session_preparation()
    }

    fn close(&mut self) -> Result<(), NetsshError> {
        if self.in_config_mode {
            let _ = self.do_exit_config_mode(None);
        }
        if self.in_shell_mode {
            let _ = self.exit_shell_mode();
        }
        if self.in_enable_mode {
            let _ = self.do_exit_enable_mode();
        }
        self.connection.close()
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
    ) -> Result<String, NetsshError> {
        self.do_send_command(
            command,
            expect_string,
            read_timeout,
            auto_find_prompt,
            strip_prompt,
            strip_command,
            normalize,
            cmd_verify,
        )
    }

    fn send_config_set_internal(
        &mut self,
        config_commands: Vec<String>,
        exit_config_mode: Option<bool>,
        _read_timeout: Option<f64>,
        strip_prompt: Option<bool>,
        strip_command: Option<bool>,
        config_mode_command: Option<&str>,
        _cmd_verify: Option<bool>,
        _enter_config_mode: Option<bool>,
        with_commit: Option<bool>,
        commit_comment: Option<&str>,
    ) -> Result<String, NetsshError> {
        let exit_config_mode = exit_config_mode.unwrap_or(true);
        let strip_prompt = strip_prompt.unwrap_or(false);
        let strip_command = strip_command.unwrap_or(true);

        match self.descriptor.mode_family {
            ModeFamily::JunosLike => self.send_config_set_junos_like(
                &config_commands,
                exit_config_mode,
                with_commit.unwrap_or(true),
                commit_comment,
            ),
            ModeFamily::Xr => self.send_config_set_xr(
                &config_commands,
                exit_config_mode,
                with_commit.unwrap_or(true),
                commit_comment,
            ),
            _ => self.send_config_set_generic(
                &config_commands,
                exit_config_mode,
                config_mode_command,
                strip_prompt,
                strip_command,
            ),
        }
    }

    fn get_device_info(&mut self) -> Result<DeviceInfo, NetsshError> {
        let output = self.do_send_command("show version", None, None, Some(false), None, None, None, None)
            .or_else(|_| self.do_send_command("show version", None, None, Some(false), None, None, None, Some(false)))?;

        let mut info = DeviceInfo {
            device_type: self.device_type.clone(),
            hostname: self.connection.base_prompt.clone().unwrap_or_default(),
            ..Default::default()
        };

        for line in output.lines() {
            let lower = line.to_lowercase();
            if lower.contains("version") && info.version.is_empty() {
                info.version = line.trim().to_string();
            } else if lower.contains("uptime") {
                info.uptime = line.trim().to_string();
            } else if (lower.contains("model") || lower.contains("processor")) && info.model.is_empty() {
                info.model = line.trim().to_string();
            } else if lower.contains("serial") && info.serial.is_empty() {
                info.serial = line.trim().to_string();
            }
        }

        Ok(info)
    }

    fn get_device_type(&self) -> &str {
        &self.device_type
    }

    fn check_config_mode(&mut self) -> Result<bool, NetsshError> {
        self.do_check_config_mode()
    }

    fn enter_config_mode(&mut self, config_command: Option<&str>) -> Result<(), NetsshError> {
        self.do_config_mode(config_command)
    }

    fn exit_config_mode(&mut self, exit_command: Option<&str>) -> Result<(), NetsshError> {
        self.do_exit_config_mode(exit_command)
    }

    fn session_preparation(&mut self) -> Result<(), NetsshError> {
        if self.connection.channel.is_none() {
            self.connection.open_channel()?;
        }

        let _ = self.connection.test_channel_read();
        self.junos_enter_cli_if_csh()?;
        self.do_set_base_prompt()?;
        self.terminal_settings()?;

        if self.descriptor.priv_enter.is_some() && !self.do_check_enable_mode()? {
            self.do_enable_mode()?;
        }

        if self.descriptor.mode_family == ModeFamily::Asa {
            self.detect_asa_multiple_mode()?;
        }

        Ok(())
    }

    fn terminal_settings(&mut self) -> Result<(), NetsshError> {
        self.set_terminal_width(511)?;
        self.disable_paging()?;
        Ok(())
    }

    fn set_terminal_width(&mut self, _width: u32) -> Result<(), NetsshError> {
        // Only IOS-like families support `terminal width`; others no-op
        // the way the upstream per-vendor classes leave the default
        // implementation untouched.
        if self.descriptor.mode_family == ModeFamily::IosLike {
            let _ = self.write_line(&format!("terminal width {}", _width));
            let _ = self.connection.read_channel();
        }
        Ok(())
    }

    fn disable_paging(&mut self) -> Result<(), NetsshError> {
        let Some(command) = self.descriptor.disable_paging_command else {
            return Ok(());
        };
        self.write_line(command)?;
        let escaped = regex::escape(command.trim());
        let _ = self.connection.read_until_pattern(&escaped, Some(10.0));
        let _ = self.read_until_prompt(Some(10.0));
        Ok(())
    }

    fn set_base_prompt(&mut self) -> Result<String, NetsshError> {
        self.do_set_base_prompt()
    }

    fn save_configuration(&mut self) -> Result<(), NetsshError> {
        if self.in_config_mode {
            self.do_exit_config_mode(None)?;
        }
        let save_cmd = match self.descriptor.mode_family {
            ModeFamily::ComwareLike | ModeFamily::HpComwareLimited => "save",
            ModeFamily::JunosLike | ModeFamily::Xr => return Ok(()), // committed already
            ModeFamily::Mikrotik | ModeFamily::Terminal => return Ok(()),
            _ => "write memory",
        };
        let output = self.do_send_command(save_cmd, None, Some(15.0), Some(false), None, None, None, Some(false))?;
        if output.to_lowercase().contains("error") {
            return Err(NetsshError::CommandError(format!(
                "Failed to save configuration: {}",
                output
            )));
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        warn!("Dropping session for {} without explicit close()", self.device_type);
        let _ = NetworkDeviceConnection::close(self);
    }
}
