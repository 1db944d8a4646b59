//! Attendance and shift-matching engine for clinic staff
//!
//! This crate decides which scheduled shift a check-in or check-out belongs
//! to, validates the event against per-location tolerance windows, enforces
//! the attendance session rules (one open session per employee, multi-shift
//! days, abandoned-session repair) and computes worked duration, shortage
//! and performance score at check-out.
//!
//! All instants are civil local time in a single fixed timezone
//! (Asia/Jakarta by default).

#![warn(missing_docs)]

pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
