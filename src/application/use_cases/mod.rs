mod reset_queue_use_case;

pub use reset_queue_use_case::{ResetOutcome, ResetQueueUseCase};
