// Outbound email — the transport that carries accepted messages to teachers.
//
// The pipeline only depends on the Mailer trait. RelayMailer hands messages
// to an HTTP mail relay; a message counts as delivered only once the relay
// has accepted it.

pub mod relay;
pub mod traits;

pub use relay::RelayMailer;
pub use traits::{Email, Mailer};
