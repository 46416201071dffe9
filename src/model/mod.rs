pub mod account;
pub mod algorithm;
pub mod events;
pub mod policy;
