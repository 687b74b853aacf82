pub mod image_payload;
pub mod job_handle;
pub mod poll_outcome;
pub mod result_payload;
