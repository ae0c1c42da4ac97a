#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod gateway;
pub mod notify;
pub mod service;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{PulseError, Result};
pub use feedback::{FeedbackItem, FeedbackKind};
