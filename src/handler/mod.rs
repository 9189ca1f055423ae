pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod feed;
pub mod jobs;
pub mod notifications;
pub mod pages;
pub mod portfolio;
pub mod session;
pub mod users;
