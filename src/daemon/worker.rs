//! Bus worker: binds the endpoints, forwards signals and executes commands
//!
//! Binding is asynchronous. The system bus carries five endpoints and the
//! session bus carries the fx-proxy; whichever connects first is usable first.
//! Until an endpoint is bound, commands addressed to it fail fast with
//! [`RemoteCallError::Unbound`].

use std::collections::HashMap;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zbus::fdo::PropertiesProxy;
use zbus::names::InterfaceName;
use zbus::proxy::CacheProperties;
use zbus::Connection;

use crate::error::RemoteCallError;
use crate::model::device::parse_device_status;
use crate::model::Profile;

use super::decode::decode_property;
use super::interfaces::{
    ConfigProxy, DeviceProxy, EffectsProxy, ProfileProxy, SlotProxy, StatusProxy,
};
use super::{
    Action, BusEvent, BusKind, CallResult, Command, EndpointName, PropertyBatch, PropertyChange,
    SignalPayload,
};

#[derive(Default)]
struct Proxies {
    slot: Option<SlotProxy<'static>>,
    profile: Option<ProfileProxy<'static>>,
    config: Option<ConfigProxy<'static>>,
    status: Option<StatusProxy<'static>>,
    device: Option<DeviceProxy<'static>>,
    effects: Option<EffectsProxy<'static>>,
    properties: HashMap<EndpointName, PropertiesProxy<'static>>,
}

struct Worker {
    proxies: Proxies,
    events: UnboundedSender<BusEvent>,
    forwarders: Vec<JoinHandle<()>>,
}

/// Run until cancelled or until the event loop goes away
pub async fn run(
    mut commands: UnboundedReceiver<Command>,
    events: UnboundedSender<BusEvent>,
    cancel: CancellationToken,
) {
    let mut binds: JoinSet<(BusKind, zbus::Result<Connection>)> = JoinSet::new();
    binds.spawn(async { (BusKind::System, Connection::system().await) });
    binds.spawn(async { (BusKind::Session, Connection::session().await) });

    let mut worker = Worker {
        proxies: Proxies::default(),
        events,
        forwarders: Vec::new(),
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(joined) = binds.join_next() => match joined {
                Ok((bus, connection)) => worker.on_connection(bus, connection).await,
                Err(err) => error!(error = ?err, "bind task panicked"),
            },
            command = commands.recv() => {
                let Some(command) = command else { break };
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = worker.execute(command) => {}
                }
            }
        }
        if worker.events.is_closed() {
            break;
        }
    }

    binds.abort_all();
    for forwarder in worker.forwarders.drain(..) {
        forwarder.abort();
    }
    info!("bus worker stopped");
}

fn endpoints_on(bus: BusKind) -> impl Iterator<Item = EndpointName> {
    EndpointName::ALL.into_iter().filter(move |e| e.bus() == bus)
}

impl Worker {
    fn send(&self, event: BusEvent) {
        if self.events.send(event).is_err() {
            debug!("event loop gone, dropping bus event");
        }
    }

    async fn on_connection(&mut self, bus: BusKind, connection: zbus::Result<Connection>) {
        let connection = match connection {
            Ok(connection) => connection,
            Err(err) => {
                error!(bus = ?bus, error = %err, "failed to connect to bus");
                for endpoint in endpoints_on(bus) {
                    self.send(BusEvent::Bound {
                        endpoint,
                        result: Err(err.to_string()),
                    });
                }
                return;
            }
        };

        for endpoint in endpoints_on(bus) {
            let result = self.bind(&connection, endpoint).await;
            let bound = result.is_ok();
            self.send(BusEvent::Bound {
                endpoint,
                result: result.map_err(|err| err.to_string()),
            });
            if bound {
                self.read_endpoint(endpoint, true, Action::Resync).await;
            }
        }
    }

    async fn bind(&mut self, connection: &Connection, endpoint: EndpointName) -> zbus::Result<()> {
        let properties = PropertiesProxy::builder(connection)
            .destination(endpoint.service())?
            .path(endpoint.path())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        self.forward_property_changes(endpoint, properties.clone()).await?;

        let events = self.events.clone();
        match endpoint {
            EndpointName::Slot => {
                let proxy = SlotProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let stream = proxy.receive_slot_switched().await?;
                self.forwarders.push(forward(stream, events, |signal| {
                    let args = signal.args().ok()?;
                    Some(BusEvent::Signal(SignalPayload::ActiveSlotChanged { slot: *args.slot() }))
                }));
                self.proxies.slot = Some(proxy);
            }
            EndpointName::Profile => {
                let proxy = ProfileProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let switched = proxy.receive_profile_switched().await?;
                self.forwarders.push(forward(switched, events.clone(), |signal| {
                    let args = signal.args().ok()?;
                    Some(BusEvent::Signal(SignalPayload::ActiveProfileChanged {
                        filename: args.profile_name().to_string(),
                    }))
                }));
                let changed = proxy.receive_profiles_changed().await?;
                self.forwarders.push(forward(changed, events, |_| {
                    Some(BusEvent::Signal(SignalPayload::ProfilesChanged))
                }));
                self.proxies.profile = Some(proxy);
            }
            EndpointName::Config => {
                let proxy = ConfigProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let stream = proxy.receive_brightness_updated().await?;
                self.forwarders.push(forward(stream, events, |signal| {
                    let args = signal.args().ok()?;
                    Some(BusEvent::Signal(SignalPayload::BrightnessChanged {
                        brightness: *args.brightness(),
                    }))
                }));
                self.proxies.config = Some(proxy);
            }
            EndpointName::Status => {
                let proxy = StatusProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let owner = proxy.inner().receive_owner_changed().await?;
                self.forwarders.push(forward(owner, events, |owner| {
                    Some(BusEvent::DaemonPresence(owner.is_some()))
                }));
                self.proxies.status = Some(proxy);
            }
            EndpointName::Device => {
                let proxy = DeviceProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let status = proxy.receive_device_status_updated().await?;
                self.forwarders.push(forward(status, events.clone(), |signal| {
                    let args = signal.args().ok()?;
                    match parse_device_status(args.status()) {
                        Ok(devices) => {
                            Some(BusEvent::Signal(SignalPayload::DeviceStatusChanged(devices)))
                        }
                        Err(err) => {
                            warn!(error = %err, "skipping malformed DeviceStatusChanged payload");
                            None
                        }
                    }
                }));
                let hotplug = proxy.receive_device_hotplug().await?;
                self.forwarders.push(forward(hotplug, events, |signal| {
                    let args = signal.args().ok()?;
                    let (usb_vid, usb_pid, failed) = *args.device_info();
                    Some(BusEvent::Signal(SignalPayload::DeviceHotplug {
                        usb_vid,
                        usb_pid,
                        failed,
                    }))
                }));
                self.proxies.device = Some(proxy);
            }
            EndpointName::Effects => {
                let proxy = EffectsProxy::builder(connection)
                    .cache_properties(CacheProperties::No)
                    .build()
                    .await?;
                let stream = proxy.receive_status_changed().await?;
                self.forwarders.push(forward(stream, events, |signal| {
                    let args = signal.args().ok()?;
                    Some(BusEvent::Signal(SignalPayload::EffectsStatusChanged(
                        args.event().to_string(),
                    )))
                }));
                self.proxies.effects = Some(proxy);
            }
        }

        self.proxies.properties.insert(endpoint, properties);
        Ok(())
    }

    /// Forward `PropertiesChanged` of one interface; invalidated properties are re-read
    async fn forward_property_changes(
        &mut self,
        endpoint: EndpointName,
        properties: PropertiesProxy<'static>,
    ) -> zbus::Result<()> {
        let mut stream = properties.receive_properties_changed().await?;
        let events = self.events.clone();
        self.forwarders.push(tokio::spawn(async move {
            while let Some(signal) = stream.next().await {
                let Ok(args) = signal.args() else { continue };
                if args.interface_name().as_str() != endpoint.interface() {
                    continue;
                }

                let mut changes: Vec<PropertyChange> = args
                    .changed_properties()
                    .iter()
                    .filter_map(|(name, value)| decode_property(endpoint, name, value))
                    .collect();
                for name in args.invalidated_properties().iter() {
                    if let Ok(Some(change)) = read_property(&properties, endpoint, name).await {
                        changes.push(change);
                    }
                }

                if changes.is_empty() {
                    continue;
                }
                let batch = PropertyBatch {
                    endpoint,
                    changes,
                    initial: false,
                };
                if events.send(BusEvent::Properties(batch)).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    /// Read every mirrored property of `endpoint` and send it as one batch
    async fn read_endpoint(&self, endpoint: EndpointName, initial: bool, action: Action) {
        let Some(properties) = self.proxies.properties.get(&endpoint) else {
            debug!(endpoint = %endpoint, "skipping read of unbound endpoint");
            return;
        };

        let mut changes = Vec::new();
        let mut failure = None;
        for name in endpoint.properties() {
            match read_property(properties, endpoint, name).await {
                Ok(Some(change)) => changes.push(change),
                Ok(None) => {}
                Err(err) => {
                    warn!(endpoint = %endpoint, property = name, error = %err, "property read failed");
                    failure.get_or_insert(err);
                }
            }
        }

        if !changes.is_empty() {
            self.send(BusEvent::Properties(PropertyBatch {
                endpoint,
                changes,
                initial,
            }));
        }
        if let Some(error) = failure {
            self.send(BusEvent::CallFailed {
                endpoint,
                action,
                error,
            });
        }
    }

    async fn execute(&self, command: Command) {
        debug!(command = ?command, "executing command");
        let action = command.action();
        let endpoint = command.endpoint();
        match self.call(command).await {
            Ok(Some(result)) => self.send(BusEvent::CallCompleted(result)),
            Ok(None) => {}
            Err(error) => {
                warn!(endpoint = %endpoint, action = ?action, error = %error, "remote call failed");
                self.send(BusEvent::CallFailed {
                    endpoint,
                    action,
                    error,
                });
            }
        }
    }

    async fn call(&self, command: Command) -> Result<Option<CallResult>, RemoteCallError> {
        let p = &self.proxies;
        match command {
            Command::SwitchSlot(slot) => {
                let proxy = bound(&p.slot, EndpointName::Slot)?;
                accepted(proxy.switch_slot(slot).await?)?;
            }
            Command::SwitchProfile(filename) => {
                let proxy = bound(&p.profile, EndpointName::Profile)?;
                accepted(proxy.switch_profile(&filename).await?)?;
            }
            Command::SetBrightness(brightness) => {
                bound(&p.config, EndpointName::Config)?
                    .set_brightness(brightness)
                    .await?;
            }
            Command::SetSfx(enabled) => {
                bound(&p.config, EndpointName::Config)?
                    .set_enable_sfx(enabled)
                    .await?;
            }
            Command::SetAmbientEffect(enabled) => {
                bound(&p.effects, EndpointName::Effects)?
                    .set_ambient_effect(enabled)
                    .await?;
            }
            Command::EnumProfiles => {
                let proxy = bound(&p.profile, EndpointName::Profile)?;
                let profiles = proxy
                    .enum_profiles()
                    .await?
                    .into_iter()
                    .map(|(name, filename)| Profile::new(name, filename))
                    .collect();
                return Ok(Some(CallResult::Profiles(profiles)));
            }
            Command::GetSlotProfiles => {
                let proxy = bound(&p.slot, EndpointName::Slot)?;
                let profiles = proxy.get_slot_profiles().await?;
                return Ok(Some(CallResult::SlotProfiles(profiles)));
            }
            Command::Resync => {
                info!("re-reading all endpoint properties");
                for endpoint in EndpointName::ALL {
                    self.read_endpoint(endpoint, true, Action::Resync).await;
                }
                if let Some(proxy) = &p.slot {
                    let profiles = proxy.get_slot_profiles().await?;
                    return Ok(Some(CallResult::SlotProfiles(profiles)));
                }
            }
            Command::PollStatus => {
                self.read_endpoint(EndpointName::Status, false, Action::PollStatus)
                    .await;
                self.read_endpoint(EndpointName::Device, false, Action::PollStatus)
                    .await;
            }
            Command::RefreshDeviceStatus => {
                bound(&p.device, EndpointName::Device)?;
                self.read_endpoint(EndpointName::Device, false, Action::RefreshDeviceStatus)
                    .await;
            }
        }
        Ok(None)
    }
}

fn bound<P>(proxy: &Option<P>, endpoint: EndpointName) -> Result<&P, RemoteCallError> {
    proxy.as_ref().ok_or(RemoteCallError::Unbound(endpoint))
}

fn accepted(status: bool) -> Result<(), RemoteCallError> {
    if status {
        Ok(())
    } else {
        Err(RemoteCallError::Rejected)
    }
}

async fn read_property(
    properties: &PropertiesProxy<'_>,
    endpoint: EndpointName,
    name: &str,
) -> Result<Option<PropertyChange>, RemoteCallError> {
    let interface = InterfaceName::try_from(endpoint.interface()).map_err(zbus::Error::from)?;
    let value = properties
        .get(interface, name)
        .await
        .map_err(zbus::Error::from)?;
    Ok(decode_property(endpoint, name, &value))
}

/// Spawn a task mapping every stream item to an event until either side closes
fn forward<S, F>(stream: S, events: UnboundedSender<BusEvent>, map: F) -> JoinHandle<()>
where
    S: Stream + Send + 'static,
    S::Item: Send,
    F: Fn(S::Item) -> Option<BusEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let mut stream = std::pin::pin!(stream);
        while let Some(item) = stream.next().await {
            if let Some(event) = map(item)
                && events.send(event).is_err()
            {
                break;
            }
        }
    })
}
