//! Connection pooling for the "fan out across many devices" use case: many
//! `Session`s held open and shared across callers instead of reconnecting
//! per command. Grounded on the teacher's own `ConnectionPool`/
//! `ConnectionManager` (its top-level `src/connection_manager.rs`, distinct
//! from `crates/netssh-core`), generalized from the teacher's fixed
//! `DeviceConnection` box to this crate's `DeviceFactory`/`Session` pair.

use crate::device_connection::{DeviceConfig, NetworkDeviceConnection};
use crate::device_factory::DeviceFactory;
use crate::error::NetsshError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

const MAX_CONNECTIONS_PER_DEVICE: usize = 5;
const CONNECTION_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// A pooled connection, tracked for reuse and idle expiry.
pub struct PooledConnection {
    connection: Box<dyn NetworkDeviceConnection + Send>,
    device_id: String,
    last_used: Instant,
    in_use: bool,
}

impl PooledConnection {
    fn new(connection: Box<dyn NetworkDeviceConnection + Send>, device_id: String) -> Self {
        Self {
            connection,
            device_id,
            last_used: Instant::now(),
            in_use: false,
        }
    }

    fn is_expired(&self) -> bool {
        !self.in_use && self.last_used.elapsed() > CONNECTION_IDLE_TIMEOUT
    }

    fn mark_in_use(&mut self) {
        self.in_use = true;
        self.last_used = Instant::now();
    }

    fn mark_available(&mut self) {
        self.in_use = false;
        self.last_used = Instant::now();
    }

    pub fn connection(&mut self) -> &mut (dyn NetworkDeviceConnection + Send) {
        self.connection.as_mut()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Pool of `Session`s keyed by caller-chosen device id, with a semaphore per
/// device bounding how many concurrent connections that device tolerates.
pub struct ConnectionPool {
    connections: Mutex<HashMap<String, Vec<Arc<Mutex<PooledConnection>>>>>,
    semaphores: Mutex<HashMap<String, Arc<Semaphore>>>,
    device_configs: Mutex<HashMap<String, DeviceConfig>>,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            semaphores: Mutex::new(HashMap::new()),
            device_configs: Mutex::new(HashMap::new()),
        }
    }

    pub fn register_device(&self, device_id: String, config: DeviceConfig) {
        self.device_configs.lock().insert(device_id.clone(), config);
        self.semaphores
            .lock()
            .entry(device_id)
            .or_insert_with(|| Arc::new(Semaphore::new(MAX_CONNECTIONS_PER_DEVICE)));
    }

    /// Acquires an existing idle connection for `device_id`, or opens a new
    /// one (blocking on a background thread, since `Session::connect` is a
    /// synchronous `ssh2` call) up to `MAX_CONNECTIONS_PER_DEVICE` at a time.
    pub async fn acquire(&self, device_id: &str) -> Result<Arc<Mutex<PooledConnection>>, NetsshError> {
        let device_config = self
            .device_configs
            .lock()
            .get(device_id)
            .cloned()
            .ok_or_else(|| NetsshError::DeviceError(format!("Device not registered: {}", device_id)))?;

        let semaphore = self
            .semaphores
            .lock()
            .get(device_id)
            .cloned()
            .ok_or_else(|| NetsshError::DeviceError(format!("Device not registered: {}", device_id)))?;

        let permit = semaphore.acquire_owned().await.map_err(|e| {
            NetsshError::DeviceError(format!("Failed to acquire connection permit: {}", e))
        })?;
        // The permit is released when dropped; since pooled connections are
        // reused rather than torn down per-call, we simply let it drop here --
        // it only serves to bound how many `acquire` calls can race to create
        // a brand new connection for this device at once.
        drop(permit);

        let existing = {
            let mut connections_map = self.connections.lock();
            let connections = connections_map.entry(device_id.to_string()).or_default();
            connections.iter().find_map(|conn| {
                let mut guard = conn.lock();
                if !guard.in_use && !guard.is_expired() {
                    guard.mark_in_use();
                    Some(Arc::clone(conn))
                } else {
                    None
                }
            })
        };

        if let Some(conn) = existing {
            debug!("Reusing pooled connection for device {}", device_id);
            return Ok(conn);
        }

        debug!("Opening new pooled connection for device {}", device_id);
        let device_id_owned = device_id.to_string();
        let device = tokio::task::spawn_blocking(move || DeviceFactory::create_device(device_config))
            .await
            .map_err(|e| NetsshError::DeviceError(format!("Connection task panicked: {}", e)))??;

        let mut pooled = PooledConnection::new(device, device_id_owned.clone());
        pooled.mark_in_use();
        let pooled = Arc::new(Mutex::new(pooled));

        self.connections
            .lock()
            .entry(device_id_owned)
            .or_default()
            .push(Arc::clone(&pooled));

        Ok(pooled)
    }

    pub fn release(&self, connection: &Arc<Mutex<PooledConnection>>) {
        let device_id = {
            let mut guard = connection.lock();
            guard.mark_available();
            guard.device_id.clone()
        };
        debug!("Released pooled connection for device {}", device_id);
    }

    /// Drops idle connections past `CONNECTION_IDLE_TIMEOUT`, closing each
    /// one as it's removed.
    pub fn cleanup(&self) {
        let mut connections_map = self.connections.lock();
        for (device_id, connections) in connections_map.iter_mut() {
            connections.retain(|conn| {
                let mut guard = conn.lock();
                if guard.is_expired() {
                    debug!("Closing expired connection for device {}", device_id);
                    let _ = guard.connection.close();
                    false
                } else {
                    true
                }
            });
        }
    }
}

/// Owns a `ConnectionPool` and the background task that periodically sweeps
/// it for idle connections.
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
        }
    }

    pub fn pool(&self) -> Arc<ConnectionPool> {
        Arc::clone(&self.pool)
    }

    pub fn register_device(&self, device_id: String, config: DeviceConfig) {
        self.pool.register_device(device_id, config);
    }

    pub async fn get_connection(&self, device_id: &str) -> Result<Arc<Mutex<PooledConnection>>, NetsshError> {
        self.pool.acquire(device_id).await
    }

    pub fn release_connection(&self, connection: &Arc<Mutex<PooledConnection>>) {
        self.pool.release(connection);
    }

    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        info!("Starting connection manager cleanup task");
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                pool.cleanup();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_device_creates_semaphore_and_config() {
        let pool = ConnectionPool::new();
        let device_id = "r1".to_string();
        let config = DeviceConfig {
            device_type: "cisco_ios".to_string(),
            host: "198.51.100.1".to_string(),
            username: "admin".to_string(),
            ..Default::default()
        };

        pool.register_device(device_id.clone(), config);

        assert!(pool.device_configs.lock().contains_key(&device_id));
        assert!(pool.semaphores.lock().contains_key(&device_id));
    }

    #[tokio::test]
    async fn acquire_on_unregistered_device_errors() {
        let pool = ConnectionPool::new();
        let err = pool.acquire("not_registered").await.unwrap_err();
        assert!(matches!(err, NetsshError::DeviceError(_)));
    }
}
