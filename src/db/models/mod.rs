//! Database models split into separate files.
//! This module re-exports individual model modules so imports like
//! `use crate::db::models::*;` work across the crate.

pub mod assignment;
pub mod event;
pub mod member;
pub mod ministry;
pub mod role;
pub mod schedule;
pub mod setting;
pub mod user;

pub use self::assignment::*;
pub use self::event::*;
pub use self::member::*;
pub use self::ministry::*;
pub use self::role::*;
pub use self::schedule::*;
pub use self::setting::*;
pub use self::user::*;
