//! Transport-and-read-loop layer: owns the `ssh2::Session`/`Channel`, the
//! raw read/write primitives, and the pattern-based read loops that
//! everything else is built on. Mode transitions and per-family command
//! semantics live one layer up, in `session`; this module only knows how to
//! move bytes and find a prompt.

use crate::channel::SSHChannel;
use crate::config::NetsshConfig;
use crate::error::NetsshError;
use crate::session_log::SessionLog;
use crate::text;
use crate::vendor::VendorDescriptor;
use rand;
use regex::Regex;
use ssh2::Session;
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

pub struct BaseConnection {
    pub session: Option<Session>,
    pub channel: SSHChannel,
    pub base_prompt: Option<String>,
    pub session_log: SessionLog,
    pub config: NetsshConfig,
    pub ansi_escape_codes: bool,
    _read_buffer: String,
}

impl BaseConnection {
    pub fn new() -> Result<Self, NetsshError> {
        let config = NetsshConfig::default();
        let mut session_log = SessionLog::new();
        if config.enable_session_log {
            session_log.enable(&config.session_log_path)?;
        }

        Ok(BaseConnection {
            session: None,
            channel: SSHChannel::new(None),
            base_prompt: None,
            session_log,
            config,
            ansi_escape_codes: false,
            _read_buffer: String::new(),
        })
    }

    pub fn with_config(config: NetsshConfig) -> Result<Self, NetsshError> {
        let mut session_log = SessionLog::new();
        if config.enable_session_log {
            session_log.enable(&config.session_log_path)?;
        }

        Ok(BaseConnection {
            session: None,
            channel: SSHChannel::new(None),
            base_prompt: None,
            session_log,
            config,
            ansi_escape_codes: false,
            _read_buffer: String::new(),
        })
    }

    pub fn connect(
        &mut self,
        host: &str,
        username: &str,
        password: Option<&str>,
        port: Option<u16>,
        connect_timeout: Option<Duration>,
    ) -> Result<(), NetsshError> {
        let port = port.unwrap_or(self.config.default_port);
        let _timeout = connect_timeout.unwrap_or(self.config.connection_timeout);
        let addr = format!("{}:{}", host, port);

        info!("Connecting to {}:{} with username {}", host, port, username);

        let tcp = TcpStream::connect(&addr).map_err(|e| NetsshError::connection_failed(addr, e))?;
        tcp.set_read_timeout(Some(self.config.read_timeout))
            .map_err(NetsshError::IoError)?;
        tcp.set_write_timeout(Some(self.config.write_timeout))
            .map_err(NetsshError::IoError)?;

        let mut session = Session::new().map_err(NetsshError::SshError)?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(NetsshError::ssh_handshake_failed)?;

        if let Some(pass) = password {
            session
                .userauth_password(username, pass)
                .map_err(|e| NetsshError::authentication_failed(username, e))?;
        } else {
            session
                .userauth_agent(username)
                .map_err(|e| NetsshError::authentication_failed(username, e))?;
        }

        let mut channel = session.channel_session().map_err(|e| {
            NetsshError::channel_failed("Failed to create channel session", Some(e))
        })?;
        channel
            .request_pty("xterm", None, None)
            .map_err(NetsshError::SshError)?;
        channel.shell().map_err(NetsshError::SshError)?;

        session.set_keepalive(true, 60);
        session.set_blocking(true);

        self.config.host = host.to_string();
        self.config.username = username.to_string();
        self.config.password = password.map(str::to_string);
        self.config.default_port = port;
        self.session = Some(session);
        self.channel = SSHChannel::new(Some(channel));
        Ok(())
    }

    pub fn open_channel(&mut self) -> Result<(), NetsshError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| NetsshError::ConnectionError("No active session".to_string()))?;

        let mut channel = session.channel_session().map_err(NetsshError::SshError)?;
        channel
            .request_pty("xterm", None, None)
            .map_err(NetsshError::SshError)?;
        channel.shell().map_err(NetsshError::SshError)?;

        self.channel = SSHChannel::new(Some(channel));
        Ok(())
    }

    pub fn set_delimiters_and_pattern(&mut self, descriptor: &VendorDescriptor) {
        self.channel.set_delimiters(descriptor.delimiter_list.to_vec());
        self.ansi_escape_codes = descriptor.ansi_escape_codes;
    }

    pub fn write_channel(&mut self, data: &str) -> Result<(), NetsshError> {
        self.channel.write_channel(data)?;
        self.session_log.write_raw(data.as_bytes())?;
        Ok(())
    }

    pub fn read_channel(&mut self) -> Result<String, NetsshError> {
        let mut new_data = self.channel.read_channel()?;

        if !new_data.is_empty() {
            let start = SystemTime::now();
            while new_data.contains('\n') && start.elapsed().unwrap_or_default().as_secs_f32() < 1.0 {
                if new_data.ends_with('\r') {
                    thread::sleep(Duration::from_millis(10));
                    match self.channel.read_channel() {
                        Ok(data) => new_data.push_str(&data),
                        Err(e) => {
                            if !matches!(e, NetsshError::TimeoutError(_)) {
                                return Err(e);
                            }
                            break;
                        }
                    }
                } else {
                    break;
                }
            }
            new_data = text::normalize_linefeeds(&new_data);
        }

        let processed = if self.ansi_escape_codes {
            text::strip_ansi(&new_data)
        } else {
            new_data
        };

        if self.session_log.is_active() && !processed.is_empty() {
            self.session_log.write(&processed)?;
        }

        let output = if !self._read_buffer.is_empty() {
            let combined = std::mem::take(&mut self._read_buffer) + &processed;
            combined
        } else {
            processed
        };

        Ok(output)
    }

    pub fn read_until_pattern(
        &mut self,
        pattern: &str,
        read_timeout: Option<f64>,
    ) -> Result<String, NetsshError> {
        let timeout = match read_timeout {
            Some(t) if t == 0.0 => None,
            Some(t) => Some(Duration::from_secs_f64(t)),
            None => Some(Duration::from_secs_f64(10.0)),
        };

        let pattern_regex = Regex::new(pattern)
            .map_err(|e| NetsshError::PatternError(format!("Invalid regex pattern: {}", e)))?;

        let mut output = String::with_capacity(16384);
        let loop_delay = Duration::from_millis(10);
        let start = SystemTime::now();

        loop {
            if let Some(timeout_duration) = timeout {
                if start.elapsed().unwrap_or_default() > timeout_duration {
                    return Err(NetsshError::TimeoutError(format!(
                        "Pattern not detected: {:?} in output",
                        pattern
                    )));
                }
            }

            match self.read_channel() {
                Ok(data) => {
                    if !data.is_empty() {
                        output.push_str(&data);
                        if pattern_regex.is_match(&output) {
                            return Ok(output);
                        }
                    }
                    thread::sleep(loop_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn read_until_prompt(&mut self, read_timeout: Option<f64>) -> Result<String, NetsshError> {
        let base_prompt = self
            .base_prompt
            .clone()
            .ok_or_else(|| NetsshError::ConnectionError("Base prompt not set".to_string()))?;
        let pattern = regex::escape(base_prompt.trim());
        self.read_until_pattern(&pattern, read_timeout)
    }

    pub fn clear_buffer(&mut self, pattern: Option<&str>) -> Result<String, NetsshError> {
        if let Some(pattern_str) = pattern {
            return self.read_until_pattern(pattern_str, Some(20.0));
        }

        thread::sleep(Duration::from_millis(100));
        let mut output = String::new();
        for _ in 0..10 {
            match self.read_channel() {
                Ok(data) if !data.is_empty() => {
                    output.push_str(&data);
                    return Ok(output);
                }
                Ok(_) => {}
                Err(e) => warn!("Error clearing buffer: {}", e),
            }
            let _ = self.write_channel("\r\n");
            thread::sleep(Duration::from_millis(100));
        }
        Ok(output)
    }

    pub fn test_channel_read(&mut self) -> Result<String, NetsshError> {
        thread::sleep(Duration::from_millis(100));
        let mut output = String::new();
        for _ in 0..40 {
            match self.read_channel() {
                Ok(data) => {
                    output.push_str(&data);
                    if !output.is_empty() {
                        break;
                    }
                }
                Err(_) => break,
            }
            thread::sleep(Duration::from_millis(100));
        }
        Ok(output)
    }

    pub fn keep_alive(&mut self) -> Result<(), NetsshError> {
        let authenticated = self
            .session
            .as_ref()
            .map(|s| s.authenticated())
            .unwrap_or(false);
        if !authenticated {
            return Err(NetsshError::ConnectionError(
                "SSH session is no longer authenticated".to_string(),
            ));
        }
        self.write_channel("\n")?;
        let _ = self.clear_buffer(None);
        Ok(())
    }

    pub fn handle_timeout<F, T>(&self, mut operation: F, max_retries: usize) -> Result<T, NetsshError>
    where
        F: FnMut() -> Result<T, NetsshError>,
    {
        let mut retry_count = 0;
        let mut backoff_ms = 100u64;
        loop {
            match operation() {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if retry_count >= max_retries {
                        return Err(e);
                    }
                    match e {
                        NetsshError::TimeoutError(_) | NetsshError::Timeout { .. } => {
                            let jitter = rand::random::<u64>() % 50;
                            thread::sleep(Duration::from_millis(backoff_ms + jitter));
                            retry_count += 1;
                            backoff_ms = std::cmp::min(backoff_ms * 2, 5000);
                        }
                        _ => return Err(e),
                    }
                }
            }
        }
    }

    pub fn close(&mut self) -> Result<(), NetsshError> {
        let _ = self.write_channel("exit\n");
        self.channel.close()?;
        self.channel = SSHChannel::new(None);
        self.session = None;
        Ok(())
    }

    /// Spawns a background task that reconnects a fresh, detached connection
    /// to the same host on a fixed interval, for callers that want a
    /// best-effort keepalive independent of the foreground session's own
    /// traffic. This does not touch `self` (the foreground channel already
    /// gets keepalive via `ssh2::Session::set_keepalive` in `connect`); it
    /// exists for long-lived monitoring use, one `tokio::spawn` per watched
    /// host.
    #[cfg(feature = "async")]
    pub fn start_keepalive_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let host = self.config.host.clone();
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        let port = self.config.default_port;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let host = host.clone();
                let username = username.clone();
                let password = password.clone();
                let result = tokio::task::spawn_blocking(move || {
                    let mut conn = BaseConnection::new()?;
                    conn.connect(&host, &username, password.as_deref(), Some(port), None)?;
                    conn.keep_alive()
                })
                .await;

                match result {
                    Ok(Ok(())) => debug!("keepalive probe to {} succeeded", host),
                    Ok(Err(e)) => warn!("keepalive probe to {} failed: {}", host, e),
                    Err(e) => warn!("keepalive task for {} panicked: {}", host, e),
                }
            }
        })
    }
}

impl Drop for BaseConnection {
    fn drop(&mut self) {
        if self.session.is_some() {
            debug!("Dropping BaseConnection, closing underlying channel/session");
            let _ = self.close();
        }
    }
}
