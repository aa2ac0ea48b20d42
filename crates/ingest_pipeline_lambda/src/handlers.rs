pub mod poller;
pub mod upload;
