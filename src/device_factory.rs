//! Single entry point that turns a [`DeviceConfig`] into a connected
//! [`NetworkDeviceConnection`], mirroring `dispatcher.create`'s `CLASS_MAPPER`
//! lookup plus `autodetect.py`'s `device_type == "autodetect"` special case.
//! Where the teacher's factory hand-writes one match arm per vendor struct,
//! this one validates the string against the shared descriptor table and
//! constructs a single generic [`Session`].

use crate::autodetect::SshDetect;
use crate::device_connection::{DeviceConfig, NetworkDeviceConnection};
use crate::error::NetsshError;
use crate::session::Session;
use crate::vendor;
use tracing::{debug, info, instrument, warn};

pub struct DeviceFactory;

impl DeviceFactory {
    #[instrument(skip(config), fields(device_type = %config.device_type, host = %config.host), level = "debug")]
    pub fn create_device(
        config: DeviceConfig,
    ) -> Result<Box<dyn NetworkDeviceConnection + Send>, NetsshError> {
        if config.device_type.is_empty() || config.device_type == "autodetect" {
            info!("Host {}: autodetecting device type", config.host);

            let mut detector = SshDetect::new(
                &config.host,
                &config.username,
                config.password.as_deref(),
                config.port,
                config.timeout,
            )?;

            let detected_type = match detector.autodetect() {
                Ok(Some(device_type)) => {
                    info!("Host {}: autodetected as {}", config.host, device_type);
                    device_type
                }
                Ok(None) => {
                    let msg = format!("Host {}: could not autodetect device type", config.host);
                    warn!("{}", msg);
                    return Err(NetsshError::UnsupportedOperation(msg));
                }
                Err(e) => {
                    warn!("Host {}: error during autodetection: {}", config.host, e);
                    return Err(e);
                }
            };

            let resolved = DeviceConfig {
                device_type: detected_type,
                ..config
            };
            return Self::create_device(resolved);
        }

        if vendor::descriptor(&config.device_type).is_none() {
            let platforms = vendor::supported_device_types().join("\n");
            return Err(NetsshError::UnsupportedDevice(format!(
                "Unsupported device_type: currently supported platforms are:\n{}",
                platforms
            )));
        }

        debug!(
            "Host {}: constructing session for device type {}",
            config.host, config.device_type
        );
        let mut session = Session::new(config)?;
        session.connect()?;
        Ok(Box::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_device_type() {
        let config = DeviceConfig {
            host: "198.51.100.1".to_string(),
            username: "admin".to_string(),
            device_type: "not_a_real_vendor".to_string(),
            ..Default::default()
        };
        let err = DeviceFactory::create_device(config).unwrap_err();
        assert!(matches!(err, NetsshError::UnsupportedDevice(_)));
    }
}
