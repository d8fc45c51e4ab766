pub mod archive;
pub mod dispatch;
pub mod drill;
pub mod health;
pub mod load;
pub mod notify;
pub mod recent;
pub mod recover;
pub mod schedule;
pub mod settings;
pub mod shared;
pub mod sign;
pub mod status;
