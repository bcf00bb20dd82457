//! Polling and command issuance for bound items.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use crate::action::Action;
use crate::channel::{self, TcpTransport, Transport};
use crate::codec::{CommandRequest, CommandResponse, Param};
use crate::command::{self, Command};
use crate::config::{BindingConfig, Config};
use crate::discovery::{Device, DeviceRegistry, DiscoveryListener};
use crate::errors::Error;
use crate::host::{BindingProvider, EventPublisher, ItemRegistry};
use crate::runtime::{self, JoinHandle};
use crate::state;

type Result<T> = std::result::Result<T, Error>;

/// Property query responses for one tick, keyed by location.
///
/// A failed query is cached as `None` so no location is queried twice per tick.
type PropertyCache = HashMap<String, Option<CommandResponse>>;

/// Drives discovery, polls bulbs for bound items and forwards intents to bulbs.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use yeelight_rs::{Config, Controller, StateStore, StaticBindings};
///
/// let store = Arc::new(StateStore::new());
/// let mut bindings = StaticBindings::new();
/// bindings.parse("Lamp", "192.168.1.20:55443#set_power")?;
///
/// let mut controller = Controller::new(Config::default(), store.clone(), store.clone());
/// controller.add_provider(Arc::new(bindings));
///
/// let controller = Arc::new(controller);
/// controller.start()?;
/// ```
pub struct Controller<T: Transport = TcpTransport> {
    config: Config,
    transport: T,
    providers: Vec<Arc<dyn BindingProvider>>,
    items: Arc<dyn ItemRegistry>,
    events: Arc<dyn EventPublisher>,
    registry: DeviceRegistry,
    discovery: Mutex<Option<DiscoveryListener>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
}

impl Controller<TcpTransport> {
    /// Create a controller that talks to bulbs over TCP.
    pub fn new(
        config: Config,
        items: Arc<dyn ItemRegistry>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let transport = TcpTransport::new(config.timeout);
        Self::with_transport(config, transport, items, events)
    }
}

impl<T: Transport> Controller<T> {
    pub fn with_transport(
        config: Config,
        transport: T,
        items: Arc<dyn ItemRegistry>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Controller {
            config,
            transport,
            providers: Vec::new(),
            items,
            events,
            registry: DeviceRegistry::new(),
            discovery: Mutex::new(None),
            poller: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_provider(&mut self, provider: Arc<dyn BindingProvider>) {
        self.providers.push(provider);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Snapshot of the devices discovered this session.
    pub fn devices(&self) -> Vec<Device> {
        self.registry.devices()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Send a search probe if discovery is running. Replies arrive asynchronously.
    pub fn probe(&self) {
        let guard = lock(&self.discovery);
        let Some(listener) = guard.as_ref() else {
            debug!("discovery not running; probe skipped");
            return;
        };
        if let Err(e) = listener.probe() {
            error!("discovery probe failed: {e}");
        }
    }

    /// Send one request to `location` and return the raw response line.
    pub async fn send(&self, location: &str, method: &str, params: Vec<Param>) -> Result<String> {
        let request = CommandRequest::new(method, params);
        self.transport.send(location, &request).await
    }

    /// Run one polling tick.
    pub async fn execute(&self) {
        let bound = self.bound_items();
        if bound.is_empty() {
            return;
        }

        self.probe();

        let mut cache = PropertyCache::new();
        for (item, config) in bound {
            if !config.action.is_polled() {
                continue;
            }

            let Some(location) = self.resolve(&config.location) else {
                debug!("{item}: device {} not discovered yet", config.location);
                continue;
            };

            if !cache.contains_key(&location) {
                let response = self.query_properties(&location).await;
                cache.insert(location.clone(), response);
            }
            let Some(Some(response)) = cache.get(&location) else {
                continue;
            };

            self.process_result(&item, config.action, response);
        }
    }

    /// Forward an intent for `item` to its bulb.
    ///
    /// Unknown items are ignored; failures are logged.
    pub async fn receive_command(&self, item: &str, command: &Command) {
        debug!("receive_command({item}, {command})");

        let Some(config) = self.item_config(item) else {
            return;
        };
        let Some(location) = self.resolve(&config.location) else {
            debug!("{item}: device {} not discovered yet", config.location);
            return;
        };

        let requests = match command::requests_for(config.action, command) {
            Ok(requests) => requests,
            Err(e) => {
                warn!("{item}: {e}");
                return;
            }
        };

        for request in requests {
            match channel::request(&self.transport, &location, &request).await {
                Ok(response) => {
                    if let Err(e) = response.result() {
                        warn!("{item}: {} rejected by {location}: {e}", request.method());
                    }
                }
                Err(e) => error!("{item}: {} to {location} failed: {e}", request.method()),
            }
        }
    }

    fn bound_items(&self) -> Vec<(String, BindingConfig)> {
        self.providers
            .iter()
            .flat_map(|provider| {
                provider
                    .item_names()
                    .into_iter()
                    .filter_map(move |item| provider.item_config(&item).map(|config| (item, config)))
            })
            .collect()
    }

    fn item_config(&self, item: &str) -> Option<BindingConfig> {
        self.providers
            .iter()
            .find_map(|provider| provider.item_config(item))
    }

    /// A `host:port` location is used as is; anything else is a device id.
    fn resolve(&self, location: &str) -> Option<String> {
        if channel::validate_location(location).is_ok() {
            Some(location.to_string())
        } else {
            self.registry.location_of(location)
        }
    }

    async fn query_properties(&self, location: &str) -> Option<CommandResponse> {
        let request = command::properties();
        match channel::request(&self.transport, location, &request).await {
            Ok(response) => {
                debug!("properties of {location}: {:?}", response.result);
                Some(response)
            }
            Err(e) => {
                error!("property query to {location} failed: {e}");
                None
            }
        }
    }

    fn process_result(&self, item: &str, action: Action, response: &CommandResponse) {
        let new_state = match state::translate(response, action) {
            Ok(s) => s,
            Err(e) => {
                warn!("{item}: cannot decode {action} from response: {e}");
                return;
            }
        };

        let old_state = match self.items.state(item) {
            Ok(s) => s,
            Err(e) => {
                debug!("{item}: {e}");
                return;
            }
        };

        if let Some(new_state) = state::changed(old_state.as_ref(), new_state) {
            debug!("{item}: {old_state:?} -> {new_state}");
            self.events.post_update(item, new_state);
        }
    }
}

impl<T: Transport + 'static> Controller<T> {
    /// Start discovery and the polling loop.
    ///
    /// Fails if the discovery socket cannot be set up; nothing is started then.
    /// Must be called from within the selected async runtime.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let listener = match DiscoveryListener::start(&self.config.bind, self.registry.clone()) {
            Ok(listener) => listener,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                error!("cannot start discovery: {e}");
                return Err(e);
            }
        };
        *lock(&self.discovery) = Some(listener);

        let weak = Arc::downgrade(self);
        let running = Arc::clone(&self.running);
        let refresh = self.config.refresh;
        let handle = runtime::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                controller.execute().await;
                drop(controller);
                runtime::sleep(refresh).await;
            }
        });
        *lock(&self.poller) = Some(handle);

        info!("polling every {:?}", refresh);
        Ok(())
    }
}

impl<T: Transport> Controller<T> {
    /// Stop polling and discovery and forget discovered devices.
    ///
    /// Blocks for up to 500 ms while the discovery thread exits; this also
    /// applies when the last `Arc` is dropped, which calls `stop`.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = lock(&self.poller).take() {
            handle.abort();
            info!("polling stopped");
        }
        if let Some(listener) = lock(&self.discovery).take() {
            listener.stop();
        }
        self.registry.clear();
    }
}

impl<T: Transport> Drop for Controller<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
