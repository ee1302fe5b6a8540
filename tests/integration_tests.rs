use std::{
    future::Future,
    sync::Arc,
    task::{Context, Poll, Wake, Waker},
    time::Duration,
};

use notify_playground::prelude::*;
use notify_playground::{NotificationPlatform, HISTORY_CAPACITY};

const PROJECT_ID: &str = "4f3c2a10-8d2b-4d55-9d0e-2f1b7c1f9a33";

fn screen_for(
    profile: DeviceProfile,
) -> (
    NotificationScreen<SimulatedPlatform>,
    Arc<SimulatedPlatform>,
    Arc<RecordingAlerts>,
) {
    let _ = env_logger::try_init();

    let platform = Arc::new(SimulatedPlatform::new(profile));
    let alerts = Arc::new(RecordingAlerts::new());
    let screen = NotificationScreen::new(
        Arc::clone(&platform),
        NotificationStore::new(),
        AppConfig::with_project_id(PROJECT_ID),
        alerts.clone(),
    );
    (screen, platform, alerts)
}

#[tokio::test]
async fn test_mount_registers_and_unmount_releases_listeners() {
    let (screen, platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Android));

    let mounted = screen.mount().await.expect("mount");

    assert_eq!(platform.listener_count().unwrap(), 2);
    assert!(platform.notification_behavior().unwrap().is_some());
    let token = screen.store().push_token().expect("token stored");
    assert!(token.starts_with("PushToken["));
    assert!(!screen.store().is_registering());
    assert!(alerts.take().is_empty());

    mounted.unmount();
    assert_eq!(platform.listener_count().unwrap(), 0);
}

#[tokio::test]
async fn test_mount_on_emulator_still_subscribes() {
    let (screen, platform, alerts) = screen_for(DeviceProfile::emulator(PlatformOs::Ios));

    let mounted = screen.mount().await.expect("mount");

    assert_eq!(screen.store().push_token(), None);
    assert_eq!(
        screen.store().permission_status(),
        PermissionStatus::Unavailable
    );
    assert_eq!(alerts.take().len(), 1);
    assert_eq!(platform.listener_count().unwrap(), 2);

    drop(mounted);
    assert_eq!(platform.listener_count().unwrap(), 0);
}

#[tokio::test]
async fn test_received_notifications_reach_store() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    platform
        .simulate_push(NotificationContent::new().title("Hello").body("World"))
        .unwrap();

    let last = screen.store().last_notification().expect("recorded");
    assert_eq!(last.request.content.title.as_deref(), Some("Hello"));
    assert_eq!(screen.store().notification_history().len(), 1);

    let rendered = screen.render();
    assert!(rendered.contains("Title: Hello"));
    assert!(rendered.contains("Body: World"));
    assert!(rendered.contains("History: 1 notification(s)"));
}

#[tokio::test]
async fn test_history_cap_through_platform() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    for n in 0..HISTORY_CAPACITY + 5 {
        platform
            .simulate_push(NotificationContent::new().title(&format!("#{n}")))
            .unwrap();
    }

    let history = screen.store().notification_history();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    let newest = format!("#{}", HISTORY_CAPACITY + 4);
    assert_eq!(
        history[0].notification.request.content.title.as_deref(),
        Some(newest.as_str())
    );
}

#[tokio::test]
async fn test_unmounted_screen_ignores_notifications() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    screen.mount().await.expect("mount").unmount();

    platform
        .simulate_push(NotificationContent::new().title("late"))
        .unwrap();

    assert_eq!(screen.store().last_notification(), None);
    assert!(screen.store().notification_history().is_empty());
}

#[tokio::test]
async fn test_tap_shows_payload() {
    let (screen, platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    let notification = platform
        .simulate_push(NotificationContent::new().data_entry("orderId", 42))
        .unwrap();
    platform
        .simulate_tap(notification, DEFAULT_ACTION_IDENTIFIER)
        .unwrap();

    let alert = alerts.last().expect("tap alert");
    assert_eq!(alert.title, "Notification Tapped");
    assert!(alert.message.contains("\"orderId\": 42"));
}

#[tokio::test]
async fn test_immediate_notification_is_delivered_silently() {
    let (screen, _platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    screen
        .schedule_immediate_notification()
        .await
        .expect("scheduled");

    let last = screen.store().last_notification().expect("delivered");
    assert_eq!(last.request.content.data["immediate"], true);
    assert!(alerts.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_notification_fires_after_two_seconds() {
    let (screen, _platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    let identifier = screen
        .schedule_delayed_notification()
        .await
        .expect("scheduled");
    assert_eq!(
        alerts.take()[0].message,
        "Local notification scheduled for 2 seconds from now"
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(screen.store().notification_history().is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let history = screen.store().notification_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].notification.request.identifier, identifier);

    let scheduled = screen
        .list_scheduled_notifications()
        .await
        .expect("listed");
    assert!(scheduled.is_empty());
    assert_eq!(
        alerts.last().expect("list alert").message,
        "No scheduled notifications"
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_stops_pending_notifications() {
    let (screen, _platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    screen.schedule_delayed_notification().await.expect("delayed");
    screen.schedule_daily_notification().await.expect("daily");

    let scheduled = screen
        .list_scheduled_notifications()
        .await
        .expect("listed");
    assert_eq!(scheduled.len(), 2);
    let listing = alerts.last().expect("list alert");
    assert!(listing
        .message
        .starts_with("Found 2 scheduled notification(s)\n\n"));
    assert!(listing.message.contains("Daily Reminder"));

    assert!(screen.cancel_all_notifications().await);
    assert_eq!(
        alerts.last().expect("cancel alert").message,
        "All scheduled notifications cancelled"
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(screen.store().notification_history().is_empty());
    assert_eq!(
        screen.list_scheduled_notifications().await.map(|s| s.len()),
        Some(0)
    );
}

#[tokio::test]
async fn test_daily_notification_is_listed() {
    let (screen, platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));

    screen.schedule_daily_notification().await.expect("daily");

    assert_eq!(
        alerts.take()[0].message,
        "Daily notification scheduled for 9:00 AM"
    );
    let scheduled = platform.get_all_scheduled_notifications().await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(
        scheduled[0].trigger,
        NotificationTrigger::Daily { hour: 9, minute: 0 }
    );
}

#[tokio::test]
async fn test_invalid_trigger_is_rejected() {
    let (_screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));

    let result = platform
        .schedule_notification(
            NotificationContent::new().title("never"),
            NotificationTrigger::daily(24, 0),
        )
        .await;

    assert!(matches!(result, Err(Error::InvalidTrigger(_))));
    assert!(platform
        .get_all_scheduled_notifications()
        .await
        .unwrap()
        .is_empty());
}

/// Polls `fut` once outside any runtime; it must complete without waiting
fn poll_ready<F: Future>(fut: F) -> F::Output {
    struct NoopWake;
    impl Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);
    match Box::pin(fut).as_mut().poll(&mut cx) {
        Poll::Ready(output) => output,
        Poll::Pending => panic!("future was not ready"),
    }
}

#[test]
fn test_timed_trigger_without_runtime_is_not_listed() {
    let _ = env_logger::try_init();
    let platform = SimulatedPlatform::new(DeviceProfile::physical(PlatformOs::Ios));

    let result = poll_ready(platform.schedule_notification(
        NotificationContent::new().title("orphan"),
        NotificationTrigger::after_seconds(5),
    ));

    assert!(matches!(result, Err(Error::Platform(_))));
    assert!(poll_ready(platform.get_all_scheduled_notifications())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_badge_handlers_leave_store_badge_alone() {
    let (screen, _platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));

    assert!(screen.set_badge_count(5).await);
    assert_eq!(alerts.take()[0].message, "Badge count set to 5");

    assert_eq!(screen.get_badge_count().await, Some(5));
    assert_eq!(alerts.take()[0].message, "Current badge count: 5");

    assert_eq!(screen.store().badge_count(), 0);
}

#[tokio::test]
async fn test_presented_badge_updates_platform_only() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");

    platform
        .simulate_push(NotificationContent::new().title("badged").badge(7))
        .unwrap();

    assert_eq!(platform.get_badge_count().await.unwrap(), 7);
    assert_eq!(screen.store().badge_count(), 0);
}

#[tokio::test]
async fn test_handler_failures_alert_without_touching_state() {
    let (screen, platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");
    alerts.take();
    let before = screen.store().snapshot();

    platform.set_failure(Some("scheduler offline")).unwrap();

    assert_eq!(screen.schedule_immediate_notification().await, None);
    assert_eq!(screen.schedule_delayed_notification().await, None);
    assert_eq!(screen.schedule_daily_notification().await, None);
    assert_eq!(screen.list_scheduled_notifications().await, None);
    assert!(!screen.cancel_all_notifications().await);
    assert_eq!(screen.get_badge_count().await, None);
    assert!(!screen.set_badge_count(1).await);

    let failures = alerts.take();
    assert_eq!(failures.len(), 7);
    assert!(failures.iter().all(|alert| alert.title == "Error"));
    assert_eq!(
        failures[1].message,
        "Failed to schedule notification: scheduler offline"
    );
    assert_eq!(screen.store().snapshot(), before);

    // handlers are independent, so recovery needs no reset
    platform.set_failure(None).unwrap();
    assert!(screen.schedule_delayed_notification().await.is_some());
}

#[tokio::test]
async fn test_register_is_guarded_while_in_flight() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    screen.store().set_is_registering(true);

    assert_eq!(screen.register_notifications().await, None);
    assert_eq!(platform.token_requests().unwrap(), 0);
    assert!(screen.store().is_registering());

    screen.store().set_is_registering(false);
    assert!(screen.register_notifications().await.is_some());
    assert!(!screen.store().is_registering());
}

#[tokio::test]
async fn test_failed_registration_resets_in_flight_flag() {
    let (screen, _platform, _alerts) = screen_for(
        DeviceProfile::physical(PlatformOs::Ios).with_token_failure("push service unreachable"),
    );

    assert_eq!(screen.register_notifications().await, None);

    assert!(!screen.store().is_registering());
    assert_eq!(screen.store().push_token(), None);
    let rendered = screen.render();
    assert!(rendered.contains("No token registered"));
    assert!(rendered.contains("Permission: error"));
    assert!(rendered.contains("Error: push service unreachable"));
}

#[tokio::test]
async fn test_view_full_token() {
    let (screen, _platform, alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));

    screen.view_full_token();
    assert_eq!(alerts.take()[0].message, "No token registered");

    let token = screen.register_notifications().await.expect("token");
    screen.view_full_token();
    let shown = alerts.take();
    assert_eq!(shown[0].title, "Token");
    assert_eq!(shown[0].message, token);
}

#[tokio::test]
async fn test_render_while_registering() {
    let (screen, _platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    screen.store().set_is_registering(true);

    assert!(screen.render().contains("Registering..."));
}

#[tokio::test]
async fn test_clear_history_button() {
    let (screen, platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));
    let _mounted = screen.mount().await.expect("mount");
    platform
        .simulate_push(NotificationContent::new().title("one"))
        .unwrap();

    screen.clear_history();

    assert!(screen.store().notification_history().is_empty());
    assert!(screen.store().last_notification().is_some());
}

#[test]
fn test_screen_from_sync_context() {
    let (screen, _platform, _alerts) = screen_for(DeviceProfile::physical(PlatformOs::Ios));

    let token = tokio_test::block_on(screen.register_notifications());

    assert!(token.is_some());
}
