//! Terminal front end for the swap widget

pub mod convert;
pub mod exchange;
pub mod list;
pub mod session;
pub mod setup;
pub mod ui;
