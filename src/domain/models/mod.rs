mod actor;
mod list_op;
mod repo;
mod request_context;

pub use actor::*;
pub use list_op::*;
pub use repo::*;
pub use request_context::*;

pub(crate) use repo::current_timestamp;
