pub mod grade_draft;
pub mod report_link_draft;

pub use grade_draft::Entity as GradeDraft;
pub use report_link_draft::Entity as ReportLinkDraft;
