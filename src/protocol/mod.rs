pub mod chat;
pub mod live;
pub mod models;
pub mod video;
