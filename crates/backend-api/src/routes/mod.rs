pub mod admin;
pub mod analytics;
pub mod auth;
pub mod bookmarks;
pub mod chat;
pub mod discovery;
pub mod health;
pub mod models;
pub mod profile;
pub mod requests;
pub mod users;
