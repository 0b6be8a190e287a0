pub mod job_role;
pub mod tracked_job;
