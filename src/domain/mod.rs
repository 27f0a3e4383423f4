pub mod avatar;
pub mod notification;
pub mod schedule;
