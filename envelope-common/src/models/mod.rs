pub mod account;
pub mod allocation;
pub mod budget;
pub mod category;
pub mod envelope;
pub mod transaction;
