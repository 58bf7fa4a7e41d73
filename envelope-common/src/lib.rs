#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod calc;
pub mod db;
pub mod models;
pub mod money;
pub mod month;
pub mod request_io;
pub mod schema;
pub mod store;
pub mod validators;
