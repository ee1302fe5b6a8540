mod alert;
mod config;
mod error;
mod notify;
mod os_impl;
pub mod registration;
mod screen;
mod store;
mod subscription;

pub use alert::*;
pub use config::*;
pub use error::Error;
pub use notify::*;
pub use os_impl::*;
pub use registration::{check_permission_status, register_for_push_notifications};
pub use screen::*;
pub use store::*;
pub use subscription::Subscription;

pub mod prelude;
