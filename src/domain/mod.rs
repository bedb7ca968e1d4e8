//! Domain entities and the store capability traits (ports) they live behind.

pub mod catalog;
pub mod order;
pub mod ports;
pub mod user;
