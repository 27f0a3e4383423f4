pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod jobs;

pub use crate::app::widget::Widget;
pub use crate::config::WidgetConfig;
pub use crate::domain::avatar::AvatarResolution;
pub use crate::domain::notification::NotificationRecord;
pub use crate::error::WidgetError;
