pub mod alerts;
pub mod events;
pub mod ingestion;
pub mod visibility;
