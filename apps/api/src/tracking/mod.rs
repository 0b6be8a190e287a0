// Tracked jobs: REST handlers, SQL, and the transactional stage sync.
// Stage rules themselves live in `crate::pipeline`.

pub mod handlers;
pub mod repo;
pub mod sync;
