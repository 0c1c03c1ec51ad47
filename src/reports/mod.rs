//! Daily product change report: aggregate the audit log for a day, render it,
//! and mail it to every admin.

pub mod aggregator;
pub mod composer;
pub mod dispatcher;
pub mod scheduler;

pub use aggregator::{aggregate, DailyChangeSet};
pub use composer::{compose, DailyReport};
pub use dispatcher::{DispatchOutcome, ReportDispatcher, ReportPreview, ReportStore};
pub use scheduler::{ReportScheduler, SchedulerHandle};
