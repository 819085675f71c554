// Message delivery pipeline: classify -> decide -> (ledger | email).

pub mod delivery;

pub use delivery::{DeliveryPipeline, DeliveryResult, MESSAGE_SUBJECT};
