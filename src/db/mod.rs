pub mod chatdb;
pub mod db;
pub mod jobdb;
pub mod notificationdb;
pub mod portfoliodb;
pub mod userdb;
