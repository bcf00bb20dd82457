//! Device discovery via SSDP-style multicast.
//!
//! Bulbs answer an `M-SEARCH` probe with an `HTTP/1.1 200 OK` datagram and
//! announce themselves with unsolicited `NOTIFY` datagrams. Both carry the
//! same headers; the first datagram seen for an id wins.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

pub const MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
pub const MULTICAST_PORT: u16 = 1982;

const SEARCH_REQUEST: &str = "M-SEARCH * HTTP/1.1\r\nMAN: \"ssdp:discover\"\r\nST: wifi_bulb\r\n";
const REPLY_LINE: &str = "HTTP/1.1 200 OK";
const NOTIFY_LINE: &str = "NOTIFY * HTTP/1.1";
const LOCATION_SCHEME: &str = "yeelight://";
const RECV_TIMEOUT: Duration = Duration::from_millis(500);
const BUFFER_LENGTH: usize = 4096;

/// A bulb found on the network. Never changes after discovery.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    id: String,
    location: String,
    model: Option<String>,
    support: Vec<String>,
}

impl Device {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `host:port` control endpoint.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Methods the bulb advertises.
    pub fn support(&self) -> &[String] {
        &self.support
    }

    pub fn supports(&self, method: &str) -> bool {
        self.support.iter().any(|m| m == method)
    }

    /// Parse a discovery reply or announcement.
    ///
    /// Returns `None` for any other datagram or when no `id` header is present.
    ///
    /// ```
    /// use yeelight_rs::Device;
    ///
    /// let packet = "HTTP/1.1 200 OK\r\nid: 0x0000000002dfb19a\r\n\
    ///               Location: yeelight://192.168.1.239:55443\r\n\
    ///               model: color\r\nsupport: get_prop set_power toggle\r\n";
    /// let device = Device::parse(packet).unwrap();
    /// assert_eq!(device.location(), "192.168.1.239:55443");
    /// assert!(device.supports("toggle"));
    ///
    /// assert!(Device::parse("M-SEARCH * HTTP/1.1\r\nid: 1\r\n").is_none());
    /// ```
    pub fn parse(packet: &str) -> Option<Self> {
        if !(packet.starts_with(REPLY_LINE) || packet.starts_with(NOTIFY_LINE)) {
            return None;
        }

        let mut id = None;
        let mut location = String::new();
        let mut model = None;
        let mut support = Vec::new();

        for line in packet.split('\n') {
            let line = line.trim_end_matches('\r');
            if let Some(v) = line.strip_prefix("id: ") {
                id = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix("Location: ") {
                location = v.strip_prefix(LOCATION_SCHEME).unwrap_or(v).to_string();
            } else if let Some(v) = line.strip_prefix("model: ") {
                model = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix("support: ") {
                support = v.split_whitespace().map(String::from).collect();
            }
        }

        let id = id.filter(|id| !id.is_empty())?;
        Some(Device {
            id,
            location,
            model,
            support,
        })
    }
}

/// Devices discovered during the current session, keyed by id.
///
/// Cloning shares the same table. Entries are only ever added, and only
/// cleared as a whole when the session ends.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Arc<Mutex<HashMap<String, Device>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `device` unless its id is already known.
    ///
    /// Returns `true` if the device was added.
    pub fn insert(&self, device: Device) -> bool {
        let mut table = self.table();
        if table.contains_key(&device.id) {
            return false;
        }
        table.insert(device.id.clone(), device);
        true
    }

    /// Parse a datagram and record the device it describes.
    ///
    /// Returns the device if it was not known before.
    pub fn ingest(&self, packet: &str) -> Option<Device> {
        let device = Device::parse(packet)?;
        self.insert(device.clone()).then_some(device)
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.table().get(id).cloned()
    }

    /// The control endpoint of a known device.
    pub fn location_of(&self, id: &str) -> Option<String> {
        self.table().get(id).map(|d| d.location.clone())
    }

    /// Snapshot of all known devices.
    pub fn devices(&self) -> Vec<Device> {
        self.table().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    pub fn clear(&self) {
        self.table().clear();
    }
}

/// Owns the multicast socket and the background receive loop.
///
/// Receiving runs on its own thread until [`stop`](Self::stop) is called or
/// the socket fails; a receive error ends discovery for the session.
pub struct DiscoveryListener {
    socket: Mutex<Option<UdpSocket>>,
    running: Arc<AtomicBool>,
    receiver: Mutex<Option<JoinHandle<()>>>,
    registry: DeviceRegistry,
}

impl DiscoveryListener {
    /// Bind `bind_addr`, join the multicast group and start receiving.
    ///
    /// Discovered devices are added to `registry`.
    pub fn start(bind_addr: &str, registry: DeviceRegistry) -> Result<Self> {
        let socket =
            UdpSocket::bind(bind_addr).map_err(|e| Error::socket("bind discovery socket", e))?;
        socket
            .join_multicast_v4(&MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| Error::socket("join multicast group", e))?;
        socket
            .set_read_timeout(Some(RECV_TIMEOUT))
            .map_err(|e| Error::socket("set_read_timeout", e))?;
        let recv_socket = socket
            .try_clone()
            .map_err(|e| Error::socket("clone discovery socket", e))?;

        let running = Arc::new(AtomicBool::new(true));
        let handle = {
            let running = Arc::clone(&running);
            let registry = registry.clone();
            thread::Builder::new()
                .name("yeelight-discovery".into())
                .spawn(move || receive_loop(recv_socket, running, registry))
                .map_err(|e| Error::socket("spawn receive loop", e))?
        };

        info!(
            "discovery listening on {:?}",
            socket.local_addr().map(|a| a.to_string())
        );

        Ok(DiscoveryListener {
            socket: Mutex::new(Some(socket)),
            running,
            receiver: Mutex::new(Some(handle)),
            registry,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        lock(&self.socket).as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Send a search request to the multicast group.
    ///
    /// Replies arrive through the receive loop. Does nothing once stopped.
    pub fn probe(&self) -> Result<()> {
        if !self.is_running() {
            debug!("discovery stopped; probe skipped");
            return Ok(());
        }
        let guard = lock(&self.socket);
        let Some(socket) = guard.as_ref() else {
            return Ok(());
        };
        socket
            .send_to(
                SEARCH_REQUEST.as_bytes(),
                SocketAddr::from((MULTICAST_ADDR, MULTICAST_PORT)),
            )
            .map_err(|e| Error::socket("send_to", e))?;
        debug!("discovery probe sent");
        Ok(())
    }

    /// Stop receiving, close the socket and wait for the receive loop to exit.
    ///
    /// Blocks the calling thread until the loop's pending receive times out,
    /// at most 500 ms.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        lock(&self.socket).take();
        if let Some(handle) = lock(&self.receiver).take() {
            let _ = handle.join();
            info!("discovery stopped");
        }
    }
}

impl Drop for DiscoveryListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn receive_loop(socket: UdpSocket, running: Arc<AtomicBool>, registry: DeviceRegistry) {
    let mut buffer = [0u8; BUFFER_LENGTH];

    while running.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buffer) {
            Ok((size, addr)) => {
                let packet = String::from_utf8_lossy(&buffer[..size]);
                debug!("discovery packet from {addr}: {packet}");
                if let Some(device) = registry.ingest(&packet) {
                    info!(
                        "found Yeelight device {} at {} (model {:?})",
                        device.id(),
                        device.location(),
                        device.model()
                    );
                }
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(e) => {
                error!("discovery socket error: {e}");
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "HTTP/1.1 200 OK\r\n\
        Cache-Control: max-age=3600\r\n\
        Location: yeelight://192.168.1.239:55443\r\n\
        Server: POSIX UPnP/1.0 YGLC/1\r\n\
        id: 0x000000000015243f\r\n\
        model: color\r\n\
        fw_ver: 18\r\n\
        support: get_prop set_default set_power toggle set_bright set_rgb set_hsv\r\n\
        power: on\r\n";

    #[test]
    fn test_parse_reply() {
        let device = Device::parse(REPLY).unwrap();
        assert_eq!(device.id(), "0x000000000015243f");
        assert_eq!(device.location(), "192.168.1.239:55443");
        assert_eq!(device.model(), Some("color"));
        assert_eq!(device.support().len(), 7);
        assert!(device.supports("set_hsv"));
        assert!(!device.supports("set_ct_abx"));
    }

    #[test]
    fn test_parse_notify() {
        let packet = "NOTIFY * HTTP/1.1\nid: 0x1\nLocation: 10.0.0.2:55443\n";
        let device = Device::parse(packet).unwrap();
        assert_eq!(device.id(), "0x1");
        assert_eq!(device.location(), "10.0.0.2:55443");
        assert_eq!(device.model(), None);
        assert!(device.support().is_empty());
    }

    #[test]
    fn test_rejects_other_packets() {
        let registry = DeviceRegistry::new();
        assert!(registry.ingest(SEARCH_REQUEST).is_none());
        assert!(registry.ingest("HTTP/1.1 404 Not Found\r\nid: 0x1\r\n").is_none());
        assert!(registry.ingest("garbage").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_requires_id() {
        assert!(Device::parse("HTTP/1.1 200 OK\r\nLocation: yeelight://1.2.3.4:55443\r\n").is_none());
        assert!(Device::parse("HTTP/1.1 200 OK\r\nid: \r\n").is_none());
    }

    #[test]
    fn test_first_seen_wins() {
        let registry = DeviceRegistry::new();
        let first = "HTTP/1.1 200 OK\r\nid: 0xabc\r\nLocation: yeelight://10.0.0.1:55443\r\n";
        let second = "NOTIFY * HTTP/1.1\r\nid: 0xabc\r\nLocation: yeelight://10.0.0.9:55443\r\n";

        assert!(registry.ingest(first).is_some());
        assert!(registry.ingest(second).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.location_of("0xabc").as_deref(), Some("10.0.0.1:55443"));
    }

    fn wait_for_devices(registry: &DeviceRegistry, count: usize) -> bool {
        for _ in 0..100 {
            if registry.len() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_listener_receives_announcement_then_stops() {
        let registry = DeviceRegistry::new();
        let listener = DiscoveryListener::start("0.0.0.0:0", registry.clone()).unwrap();
        assert!(listener.is_running());
        let port = listener.local_addr().unwrap().port();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"garbage", ("127.0.0.1", port)).unwrap();
        sender
            .send_to(
                b"NOTIFY * HTTP/1.1\r\nid: 0x2a\r\nLocation: yeelight://127.0.0.1:55443\r\n",
                ("127.0.0.1", port),
            )
            .unwrap();

        assert!(wait_for_devices(&registry, 1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.location_of("0x2a").as_deref(), Some("127.0.0.1:55443"));

        listener.stop();
        assert!(!listener.is_running());
        assert!(listener.local_addr().is_none());
        assert!(listener.probe().is_ok());
        assert_eq!(listener.registry().len(), 1);
    }

    #[test]
    fn test_listener_bind_failure() {
        assert!(matches!(
            DiscoveryListener::start("not an address", DeviceRegistry::new()),
            Err(Error::Socket { .. })
        ));
    }

    #[test]
    fn test_registry_clear() {
        let registry = DeviceRegistry::new();
        let shared = registry.clone();
        registry.ingest(REPLY);
        assert_eq!(shared.devices().len(), 1);
        shared.clear();
        assert!(registry.is_empty());
        assert!(registry.get("0x000000000015243f").is_none());
    }
}
