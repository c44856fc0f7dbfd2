use crate::error::NetsshError;
use regex::Regex;
use ssh2::Channel as SSH2Channel;
use std::cell::RefCell;
use std::io::Read;
use tracing::debug;

pub struct SSHChannel {
    remote_conn: RefCell<Option<SSH2Channel>>,
    base_prompt: Option<String>,
    prompt_regex: Option<Regex>,
    // Characters that plausibly end a prompt line, used only as an early-exit
    // hint in the raw read loops below; correctness depends on base_pattern,
    // not on this set. Vendor descriptors override it to their delimiter_list.
    delimiters: Vec<char>,
}

impl Clone for SSHChannel {
    fn clone(&self) -> Self {
        // We can't clone the SSH2Channel, so we create a new one with None
        Self {
            remote_conn: RefCell::new(None),
            base_prompt: self.base_prompt.clone(),
            prompt_regex: self.prompt_regex.clone(),
            delimiters: self.delimiters.clone(),
        }
    }
}

impl SSHChannel {
    pub fn new(conn: Option<SSH2Channel>) -> Self {
        Self {
            remote_conn: RefCell::new(conn),
            base_prompt: None,
            prompt_regex: None,
            delimiters: vec!['>', '#'],
        }
    }

    pub fn set_delimiters(&mut self, delimiters: Vec<char>) {
        self.delimiters = delimiters;
    }

    fn contains_delimiter(&self, s: &str) -> bool {
        s.chars().any(|c| self.delimiters.contains(&c))
    }

    /// Records the discovered base prompt and the vendor-specific regex that
    /// recognizes it (and any other prompt the device may show) as the read
    /// terminator. The regex itself is built by the vendor descriptor, not here,
    /// since the terminator shape (delimiter set, bracket style, stem rule)
    /// differs per vendor family.
    pub fn set_base_prompt(&mut self, prompt: &str, base_pattern: Regex) {
        debug!(target: "SSHChannel::set_base_prompt", "Setting base prompt to: {}", prompt);
        self.base_prompt = Some(prompt.to_string());
        self.prompt_regex = Some(base_pattern);
    }

    pub fn write_channel(&self, out_data: &str) -> Result<(), NetsshError> {
        debug!(target: "SSHChannel::write_channel", "Writing to channel: {:?}", out_data);

        let mut remote_conn = self.remote_conn.borrow_mut();
        let channel = remote_conn.as_mut().ok_or_else(|| {
            NetsshError::WriteError(
                "Attempt to write data, but there is no active channel.".to_string(),
            )
        })?;

        let bytes = out_data.as_bytes();
        channel
            .write_all(bytes)
            .map_err(|e| NetsshError::WriteError(format!("Failed to write to channel: {}", e)))?;

        channel
            .flush()
            .map_err(|e| NetsshError::WriteError(format!("Failed to flush channel: {}", e)))?;

        debug!(target: "SSHChannel::write_channel", "Successfully wrote to channel");
        Ok(())
    }

    pub fn read_channel(&self) -> Result<String, NetsshError> {
        debug!(target: "SSHChannel::read_channel", "Reading all available data from channel");

        if self.is_none() {
            return Err(NetsshError::ReadError(
                "Attempt to read, but there is no active channel.".to_string(),
            ));
        }

        let mut remote_conn = self.remote_conn.borrow_mut();
        let channel = remote_conn.as_mut().unwrap(); // Safe because we checked is_none()

        let mut output = String::new();
        let mut read_something = false;
        let mut buffer = vec![0; 8192];

        // Read while there's data and we haven't found a prompt
        while !channel.eof() {
            match channel.read(&mut buffer) {
                Ok(n) => {
                    if n > 0 {
                        read_something = true;
                        match std::str::from_utf8(&buffer[..n]) {
                            Ok(s) => output.push_str(s),
                            Err(_) => output.push_str(&String::from_utf8_lossy(&buffer[..n])),
                        }

                        debug!(target: "SSHChannel::read_channel", "Read bytes from channel loop output: {}", output);

                        if output.contains("assword:") {
                            debug!(target: "SSHChannel::read_channel", "Found prompt/terminator, exiting read loop");
                            break;
                        }

                        if self.contains_delimiter(&output) {
                            debug!(target: "SSHChannel::read_channel", "Found prompt/terminator, exiting read loop");
                            break;
                        }
                    } else {
                        debug!(target: "SSHChannel::read_channel", "No data available or channel closed");
                        if !read_something {
                            return Ok(String::new());
                        }
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    debug!(target: "SSHChannel::read_channel", "No more data available right now, read_something: {}", read_something);
                    if !read_something {
                        return Ok(String::new());
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    debug!(target: "SSHChannel::read_channel", "Error reading from channel: {}", e);
                    break;
                }
            }
        }

        debug!(target: "SSHChannel::read_channel", "Read complete, output length: {}", output.len());
        Ok(output)
    }

    pub fn is_none(&self) -> bool {
        self.remote_conn.borrow().is_none()
    }

    /// Close the SSH channel
    pub fn close(&self) -> Result<(), NetsshError> {
        debug!(target: "SSHChannel::close", "Closing channel");

        if let Some(mut channel) = self.remote_conn.borrow_mut().take() {
            if let Err(e) = channel.send_eof() {
                debug!(target: "SSHChannel::close", "Error sending EOF: {}", e);
            }

            if let Err(e) = channel.close() {
                debug!(target: "SSHChannel::close", "Error closing channel: {}", e);
                return Err(NetsshError::ChannelError(format!(
                    "Failed to close channel: {}",
                    e
                )));
            }

            if let Err(e) = channel.wait_close() {
                debug!(target: "SSHChannel::close", "Error waiting for channel to close: {}", e);
                return Err(NetsshError::ChannelError(format!(
                    "Failed to wait for channel close: {}",
                    e
                )));
            }

            debug!(target: "SSHChannel::close", "Channel closed successfully");
        } else {
            debug!(target: "SSHChannel::close", "No active channel to close");
        }

        Ok(())
    }
}
