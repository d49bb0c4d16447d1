//! Client data layer for Taskboard.
//!
//! [`api`] wraps the HTTP endpoints; [`board_page`] owns the grouped board state
//! and re-fetches it after every change.
pub mod api;
pub mod board_page;

pub use api::{CardApi, ClientError, HttpCardApi, RegisterForm, UserInfo};
pub use board_page::BoardPage;
