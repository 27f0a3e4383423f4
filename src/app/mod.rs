pub mod avatar;
pub mod feed;
pub mod hash;
pub mod presenter;
pub mod theme;
pub mod time_ago;
pub mod widget;
