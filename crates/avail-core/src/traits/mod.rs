//! Ports - interfaces the domain layer requires from infrastructure

mod ports;
mod repositories;

pub use ports::{ChatPort, ConfirmPrompt};
pub use repositories::{PollRepository, RecordRepository, RepoResult};
