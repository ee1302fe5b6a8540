use std::{sync::Arc, time::Duration};

use notify_playground::prelude::*;

const DEFAULT_PROJECT_ID: &str = "00000000-0000-0000-0000-000000000000";

fn get_project_id() -> String {
    std::env::var("NOTIFY_PROJECT_ID").unwrap_or_else(|_| DEFAULT_PROJECT_ID.to_string())
}

fn print_alerts(alerts: &RecordingAlerts) {
    for alert in alerts.take() {
        println!("💬 {}: {}", alert.title, alert.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let platform = Arc::new(SimulatedPlatform::new(DeviceProfile::physical(
        PlatformOs::Android,
    )));
    let alerts = Arc::new(RecordingAlerts::new());
    let screen = NotificationScreen::new(
        Arc::clone(&platform),
        NotificationStore::new(),
        AppConfig::with_project_id(&get_project_id()),
        alerts.clone(),
    );

    let mounted = screen.mount().await?;
    print_alerts(&alerts);
    println!("{}\n", screen.render());

    screen.schedule_immediate_notification().await;
    screen.schedule_delayed_notification().await;
    screen.schedule_daily_notification().await;
    screen.list_scheduled_notifications().await;
    print_alerts(&alerts);

    println!("⏳ Waiting for the delayed notification...");
    tokio::time::sleep(Duration::from_secs(3)).await;

    if let Some(notification) = screen.store().last_notification() {
        platform.simulate_tap(notification, DEFAULT_ACTION_IDENTIFIER)?;
    }

    screen.set_badge_count(3).await;
    screen.get_badge_count().await;
    screen.cancel_all_notifications().await;
    screen.list_scheduled_notifications().await;
    screen.view_full_token();
    print_alerts(&alerts);

    println!("\n{}", screen.render());

    mounted.unmount();
    println!("\n🎉 Listeners left after unmount: {}", platform.listener_count()?);

    Ok(())
}
