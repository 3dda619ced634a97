//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pantograph-core for real hardware:
//!
//! - Serial command-station link over `embedded-io` byte streams

#![no_std]
#![deny(unsafe_code)]

pub mod serial;

pub use serial::SerialLink;
