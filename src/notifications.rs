//! Checkout notification pipeline.
//!
//! Handlers publish events on an in-process channel; a background listener
//! task consumes them, applies the recipient rules against the settings row,
//! and delivers through the [`mailer::Mailer`] seam and the optional webhook
//! sink. Delivery failures are logged, never surfaced to the request that
//! triggered them.

pub mod events;
pub mod listener;
pub mod mail;
pub mod mailer;
pub mod webhook;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error("webhook delivery failed: {0}")]
    Webhook(#[from] reqwest::Error),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}
