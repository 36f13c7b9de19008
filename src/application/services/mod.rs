mod ask_job_registry;
mod ask_job_runner;
mod ask_service;
mod diversity_controller;
mod job_reaper;

pub use ask_job_registry::{AskJobHandle, AskJobRegistry, RegistryError};
pub use ask_job_runner::{AskJobRunner, CandidatePolicy};
pub use ask_service::{AskService, AskServiceError};
pub use diversity_controller::{
    DiversityController, DiversityError, DiversityOutcome, DiversityRequest,
};
pub use job_reaper::JobReaper;
