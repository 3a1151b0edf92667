mod activity;
mod error;
mod project;
mod result;

pub use activity::{ActivityRecord, RawActivity};
pub use error::ValidationError;
pub use project::ProjectMap;
pub use result::Result;
