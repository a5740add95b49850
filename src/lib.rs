//! Export unread Gmail inbox messages to an `.xlsx` spreadsheet.
//!
//! The pipeline is linear: [`auth`] obtains an access token,
//! [`batch::fetch_unread`] lists and fetches messages through a
//! [`mail::gmail::MailProvider`], [`mail::extract`] normalizes each message
//! into a [`domain::email::NormalizedRecord`], and an [`export::Exporter`]
//! writes the rows.

pub mod app;
pub mod auth;
pub mod batch;
pub mod config;
pub mod domain;
pub mod export;
pub mod mail;
