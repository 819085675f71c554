// Nameless: anonymous student feedback, screened for abuse before delivery.
//
// This is the library root. Each module corresponds to one stage of the
// moderation pipeline or one of the collaborators it talks to.

pub mod accounts;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod mail;
pub mod moderation;
pub mod output;
pub mod pipeline;
pub mod search;
pub mod status;
pub mod toxicity;

#[cfg(feature = "web")]
pub mod web;
