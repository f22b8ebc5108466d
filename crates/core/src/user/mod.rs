//! User profile ports

pub mod ports;
