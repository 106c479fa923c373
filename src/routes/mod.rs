pub mod listing;
pub mod upload;
