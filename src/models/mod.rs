pub mod chatmodel;
pub mod jobmodel;
pub mod notificationmodel;
pub mod usermodel;
