//! Community feedback analysis.
//!
//! A fixed four-node sequence over one text model. Each node returns a typed
//! result; the compile node assembles them into a `DashboardReport`.

pub mod types;
pub mod stages;
pub mod workflow;

pub use types::*;
pub use workflow::FeedbackWorkflow;
