//! In-process notification platform.
//!
//! Behaves like a device whose OS permission, device kind and push service
//! outcome are chosen up front. Timed triggers are driven by tokio timers, so
//! scheduling needs to happen inside a tokio runtime. Pushes and taps are
//! injected with [`SimulatedPlatform::simulate_push`] and
//! [`SimulatedPlatform::simulate_tap`].

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Local, NaiveTime, Utc};
use tokio::{runtime::Handle, task::JoinHandle};
use uuid::Uuid;

use crate::{
    Error, Notification, NotificationBehavior, NotificationChannel, NotificationContent,
    NotificationPlatform, NotificationRequest, NotificationResponse, NotificationTrigger,
    PermissionStatus, PlatformOs, PushToken, ReceivedListener, ResponseListener, SubscriptionId,
};

type SharedReceivedListener = Arc<dyn Fn(Notification) + Send + Sync + 'static>;
type SharedResponseListener = Arc<dyn Fn(NotificationResponse) + Send + Sync + 'static>;

/// What the simulated device answers
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub os: PlatformOs,
    pub is_physical_device: bool,
    /// OS permission before the app asks
    pub permission: PermissionStatus,
    /// What the user picks when prompted
    pub prompt_response: PermissionStatus,
    /// Message of the error the push service returns, if any
    pub token_failure: Option<String>,
    /// Message of the error permission queries and prompts return, if any
    pub permission_failure: Option<String>,
}

impl DeviceProfile {
    /// A real device where the user grants permission when asked
    pub fn physical(os: PlatformOs) -> Self {
        Self {
            os,
            is_physical_device: true,
            permission: PermissionStatus::Unknown,
            prompt_response: PermissionStatus::Granted,
            token_failure: None,
            permission_failure: None,
        }
    }

    pub fn emulator(os: PlatformOs) -> Self {
        Self {
            is_physical_device: false,
            ..Self::physical(os)
        }
    }

    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_prompt_response(mut self, response: PermissionStatus) -> Self {
        self.prompt_response = response;
        self
    }

    pub fn with_token_failure(mut self, message: &str) -> Self {
        self.token_failure = Some(message.to_owned());
        self
    }

    pub fn with_permission_failure(mut self, message: &str) -> Self {
        self.permission_failure = Some(message.to_owned());
        self
    }
}

#[derive(Default)]
struct SimState {
    permission: PermissionStatus,
    behavior: Option<NotificationBehavior>,
    channels: HashMap<String, NotificationChannel>,
    scheduled: Vec<NotificationRequest>,
    timers: HashMap<String, JoinHandle<()>>,
    badge: u32,
    failure: Option<String>,
    next_subscription: u64,
    received_listeners: BTreeMap<SubscriptionId, SharedReceivedListener>,
    response_listeners: BTreeMap<SubscriptionId, SharedResponseListener>,
    token_requests: usize,
    permission_requests: usize,
}

impl SimState {
    fn next_subscription_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }

    fn check_failure(&self) -> Result<(), Error> {
        match &self.failure {
            Some(message) => Err(Error::Platform(message.clone())),
            None => Ok(()),
        }
    }
}

struct Inner {
    profile: DeviceProfile,
    device_id: Uuid,
    state: Mutex<SimState>,
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, SimState>, Error> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Present `request` and hand it to every received listener
    fn deliver(&self, request: NotificationRequest) -> Result<Notification, Error> {
        let notification = Notification {
            date: Utc::now(),
            request,
        };

        let listeners: Vec<SharedReceivedListener> = {
            let mut state = self.lock()?;
            let set_badge = state.behavior.is_some_and(|b| b.should_set_badge);
            if let (true, Some(badge)) = (set_badge, notification.request.content.badge) {
                state.badge = badge;
            }
            state.received_listeners.values().cloned().collect()
        };

        log::debug!(
            "delivering notification {} to {} listener(s)",
            notification.request.identifier,
            listeners.len()
        );
        for listener in listeners {
            listener(notification.clone());
        }

        Ok(notification)
    }

    /// Timer callback; returns false once the request is gone
    fn fire(&self, identifier: &str, repeats: bool) -> Result<bool, Error> {
        let request = {
            let mut state = self.lock()?;
            let Some(index) = state
                .scheduled
                .iter()
                .position(|request| request.identifier == identifier)
            else {
                return Ok(false);
            };
            if repeats {
                state.scheduled[index].clone()
            } else {
                state.timers.remove(identifier);
                state.scheduled.remove(index)
            }
        };

        self.deliver(request)?;
        Ok(repeats)
    }
}

/// Delay until the next firing of a timed trigger
fn next_delay(trigger: NotificationTrigger) -> Duration {
    match trigger {
        NotificationTrigger::Immediate => Duration::ZERO,
        NotificationTrigger::TimeInterval { seconds, .. } => Duration::from_secs(seconds),
        NotificationTrigger::Daily { hour, minute } => {
            let now = Local::now().naive_local();
            let Some(at) = NaiveTime::from_hms_opt(hour.into(), minute.into(), 0) else {
                return Duration::from_secs(24 * 60 * 60);
            };
            let mut next = now.date().and_time(at);
            if next <= now {
                next += chrono::Duration::days(1);
            }
            (next - now).to_std().unwrap_or(Duration::ZERO)
        }
    }
}

fn repeats(trigger: NotificationTrigger) -> bool {
    match trigger {
        NotificationTrigger::Immediate => false,
        NotificationTrigger::TimeInterval { repeats, .. } => repeats,
        NotificationTrigger::Daily { .. } => true,
    }
}

/// In-memory notification platform
#[derive(Clone)]
pub struct SimulatedPlatform {
    inner: Arc<Inner>,
}

impl fmt::Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedPlatform")
            .field("profile", &self.inner.profile)
            .field("device_id", &self.inner.device_id)
            .finish_non_exhaustive()
    }
}

impl SimulatedPlatform {
    pub fn new(profile: DeviceProfile) -> Self {
        let state = SimState {
            permission: profile.permission,
            ..SimState::default()
        };
        Self {
            inner: Arc::new(Inner {
                profile,
                device_id: Uuid::new_v4(),
                state: Mutex::new(state),
            }),
        }
    }

    /// Deliver a remote push right away
    pub fn simulate_push(&self, content: NotificationContent) -> Result<Notification, Error> {
        self.inner.deliver(NotificationRequest {
            identifier: Uuid::new_v4().to_string(),
            content,
            trigger: NotificationTrigger::Immediate,
        })
    }

    /// Report that the user interacted with `notification`
    pub fn simulate_tap(
        &self,
        notification: Notification,
        action_identifier: &str,
    ) -> Result<(), Error> {
        let listeners: Vec<SharedResponseListener> =
            self.inner.lock()?.response_listeners.values().cloned().collect();
        let response = NotificationResponse {
            notification,
            action_identifier: action_identifier.to_owned(),
            user_text: None,
        };
        for listener in listeners {
            listener(response.clone());
        }
        Ok(())
    }

    /// The user changed the app's notification setting in the OS
    pub fn set_os_permission(&self, status: PermissionStatus) -> Result<(), Error> {
        self.inner.lock()?.permission = status;
        Ok(())
    }

    /// Make channel, scheduling, listing, cancelling and badge calls fail with `message`
    pub fn set_failure(&self, message: Option<&str>) -> Result<(), Error> {
        self.inner.lock()?.failure = message.map(str::to_owned);
        Ok(())
    }

    pub fn token_requests(&self) -> Result<usize, Error> {
        Ok(self.inner.lock()?.token_requests)
    }

    pub fn permission_requests(&self) -> Result<usize, Error> {
        Ok(self.inner.lock()?.permission_requests)
    }

    /// Number of live received and response listeners
    pub fn listener_count(&self) -> Result<usize, Error> {
        let state = self.inner.lock()?;
        Ok(state.received_listeners.len() + state.response_listeners.len())
    }

    pub fn channel(&self, id: &str) -> Result<Option<NotificationChannel>, Error> {
        Ok(self.inner.lock()?.channels.get(id).cloned())
    }

    pub fn notification_behavior(&self) -> Result<Option<NotificationBehavior>, Error> {
        Ok(self.inner.lock()?.behavior)
    }

    fn check_permission_failure(&self) -> Result<(), Error> {
        match &self.inner.profile.permission_failure {
            Some(message) => Err(Error::Platform(message.clone())),
            None => Ok(()),
        }
    }

    /// List `request` and drive it with a timer task on `runtime`
    fn start_timer(&self, runtime: &Handle, request: NotificationRequest) -> Result<(), Error> {
        let identifier = request.identifier.clone();
        let trigger = request.trigger;
        self.inner.lock()?.scheduled.push(request);

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let repeats = repeats(trigger);
        let id = identifier.clone();

        let handle = runtime.spawn(async move {
            loop {
                tokio::time::sleep(next_delay(trigger)).await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                match inner.fire(&id, repeats) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => {
                        log::error!("failed to fire notification {id}: {err}");
                        break;
                    }
                }
            }
        });

        self.inner.lock()?.timers.insert(identifier, handle);
        Ok(())
    }
}

#[async_trait]
impl NotificationPlatform for SimulatedPlatform {
    fn os(&self) -> PlatformOs {
        self.inner.profile.os
    }

    fn is_physical_device(&self) -> bool {
        self.inner.profile.is_physical_device
    }

    fn set_notification_handler(&self, behavior: NotificationBehavior) -> Result<(), Error> {
        self.inner.lock()?.behavior = Some(behavior);
        Ok(())
    }

    async fn set_notification_channel(&self, channel: NotificationChannel) -> Result<(), Error> {
        if self.inner.profile.os != PlatformOs::Android {
            return Err(Error::NotSupported);
        }
        self.inner.lock()?.check_failure()?;
        log::debug!("configured notification channel {}", channel.id);
        self.inner
            .lock()?
            .channels
            .insert(channel.id.clone(), channel);
        Ok(())
    }

    async fn get_permissions(&self) -> Result<PermissionStatus, Error> {
        self.check_permission_failure()?;
        Ok(self.inner.lock()?.permission)
    }

    /// Prompts only while the permission is undetermined; afterwards the OS
    /// answers with the recorded choice.
    async fn request_permissions(&self) -> Result<PermissionStatus, Error> {
        let mut state = self.inner.lock()?;
        state.permission_requests += 1;
        self.check_permission_failure()?;
        if state.permission == PermissionStatus::Unknown {
            state.permission = self.inner.profile.prompt_response;
        }
        Ok(state.permission)
    }

    async fn get_push_token(&self, project_id: &str) -> Result<PushToken, Error> {
        self.inner.lock()?.token_requests += 1;

        if let Some(message) = &self.inner.profile.token_failure {
            return Err(Error::TokenRequest(message.clone()));
        }
        if project_id.is_empty() {
            return Err(Error::TokenRequest("project id must not be empty".to_owned()));
        }

        Ok(PushToken {
            data: format!("PushToken[{}]", self.inner.device_id.simple()),
        })
    }

    async fn schedule_notification(
        &self,
        content: NotificationContent,
        trigger: NotificationTrigger,
    ) -> Result<String, Error> {
        self.inner.lock()?.check_failure()?;
        trigger.validate()?;

        let request = NotificationRequest {
            identifier: Uuid::new_v4().to_string(),
            content,
            trigger,
        };
        let identifier = request.identifier.clone();

        if trigger == NotificationTrigger::Immediate {
            self.inner.deliver(request)?;
            return Ok(identifier);
        }

        // fail before anything is listed
        let runtime = Handle::try_current()
            .map_err(|err| Error::Platform(format!("timed triggers need a tokio runtime: {err}")))?;
        self.start_timer(&runtime, request)?;
        log::debug!("scheduled notification {identifier} with {trigger:?}");
        Ok(identifier)
    }

    async fn get_all_scheduled_notifications(&self) -> Result<Vec<NotificationRequest>, Error> {
        let state = self.inner.lock()?;
        state.check_failure()?;
        Ok(state.scheduled.clone())
    }

    async fn cancel_all_scheduled_notifications(&self) -> Result<(), Error> {
        let mut state = self.inner.lock()?;
        state.check_failure()?;
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.scheduled.clear();
        Ok(())
    }

    async fn get_badge_count(&self) -> Result<u32, Error> {
        let state = self.inner.lock()?;
        state.check_failure()?;
        Ok(state.badge)
    }

    async fn set_badge_count(&self, count: u32) -> Result<bool, Error> {
        let mut state = self.inner.lock()?;
        state.check_failure()?;
        state.badge = count;
        Ok(true)
    }

    fn add_notification_received_listener(
        &self,
        listener: ReceivedListener,
    ) -> Result<SubscriptionId, Error> {
        let mut state = self.inner.lock()?;
        let id = state.next_subscription_id();
        state.received_listeners.insert(id, Arc::from(listener));
        Ok(id)
    }

    fn add_notification_response_received_listener(
        &self,
        listener: ResponseListener,
    ) -> Result<SubscriptionId, Error> {
        let mut state = self.inner.lock()?;
        let id = state.next_subscription_id();
        state.response_listeners.insert(id, Arc::from(listener));
        Ok(id)
    }

    fn remove_subscription(&self, id: SubscriptionId) -> Result<(), Error> {
        let mut state = self.inner.lock()?;
        let removed = state.received_listeners.remove(&id).is_some()
            || state.response_listeners.remove(&id).is_some();
        if removed {
            Ok(())
        } else {
            Err(Error::Other(format!("unknown subscription {id:?}")))
        }
    }
}
