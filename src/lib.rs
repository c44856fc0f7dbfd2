pub mod autodetect;
pub mod base_connection;
pub mod channel;
pub mod config;
pub mod connection_manager;
pub mod device_connection;
pub mod device_factory;
pub mod error;
pub mod logging;
pub mod session;
pub mod session_log;
pub mod settings;
pub mod text;
pub mod vendor;
pub mod vendor_error_patterns;

#[macro_use]
extern crate lazy_static;

pub mod patterns {
    use regex::Regex;

    lazy_static! {
        pub static ref PROMPT_PATTERN: Regex = Regex::new(r"[>#]$").unwrap();
        pub static ref CONFIG_PROMPT_PATTERN: Regex = Regex::new(r"\(config[^)]*\)#$").unwrap();
        pub static ref IP_ADDRESS_PATTERN: Regex = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap();
        pub static ref MAC_ADDRESS_PATTERN: Regex =
            Regex::new(r"\b([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})\b").unwrap();
        pub static ref ERROR_PATTERN: Regex = Regex::new(r"(?i)error|invalid|failed|denied|timeout").unwrap();
    }
}

pub use autodetect::SshDetect;
pub use base_connection::BaseConnection;
pub use connection_manager::{ConnectionManager, ConnectionPool, PooledConnection};
pub use device_connection::{DeviceConfig, DeviceInfo, NetworkDeviceConnection, SendCommand, SendConfigSet};
pub use device_factory::DeviceFactory;
pub use error::NetsshError;
pub use logging::init_logging;
pub use session::Session;
pub use settings::Settings;
pub use vendor::{supported_device_types, ModeFamily, VendorDescriptor};
