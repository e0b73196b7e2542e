//! User records stored as opaque JSON objects, one blob per user.

pub mod codec;
pub mod handlers;

pub use codec::UserRecord;
pub use handlers::{HandlerRequest, HandlerResponse, UserHandlers};
