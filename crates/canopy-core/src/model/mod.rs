pub mod page;
pub mod resolved;
pub mod slot_policy;
pub mod version;
pub mod widget;

pub use page::Page;
pub use resolved::{ResolutionMode, ResolvedSlot, ResolvedWidget};
pub use slot_policy::SlotPolicy;
pub use version::{PublishOutcome, Version, VersionContent, VersionStatus};
pub use widget::WidgetRecord;
