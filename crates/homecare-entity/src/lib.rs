//! # homecare-entity
//!
//! Records and value objects of the reminder engine. Persisted rows derive
//! `sqlx::FromRow`; trigger contexts are plain values handed in by the
//! services that own medicine schedules and appointments.

pub mod appointment;
pub mod medicine;
pub mod notification;
