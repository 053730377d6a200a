#![allow(dead_code)]

pub mod app;
pub mod factory;

pub use app::{closed_endpoint, MockRailway};
pub use factory::*;
