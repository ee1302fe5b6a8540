use std::sync::Arc;

use crate::{NotificationPlatform, SubscriptionId};

/// A platform event listener that is removed when dropped
#[derive(Debug)]
pub struct Subscription<P>
where
    P: NotificationPlatform + ?Sized,
{
    platform: Arc<P>,
    id: SubscriptionId,
}

impl<P> Subscription<P>
where
    P: NotificationPlatform + ?Sized,
{
    /// Take ownership of a listener registered on `platform`
    pub fn new(platform: Arc<P>, id: SubscriptionId) -> Self {
        Self { platform, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl<P> Drop for Subscription<P>
where
    P: NotificationPlatform + ?Sized,
{
    fn drop(&mut self) {
        if let Err(err) = self.platform.remove_subscription(self.id) {
            log::error!("failed to remove subscription {:?}: {err}", self.id);
        }
    }
}
