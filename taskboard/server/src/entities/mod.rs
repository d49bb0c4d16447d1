//! `SeaORM` Entity definitions for the taskboard schema.

pub mod card;
pub mod user;
