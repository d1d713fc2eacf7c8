pub mod link;
pub mod requests;

pub use link::{
    ClickContext, ClickEvent, LinkAnalytics, LinkRecord, LinkSummary, NewLink, Validity,
    DEFAULT_CUSTOM_NAME, DIRECT_REFERRER,
};
pub use requests::{BulkCreateRequest, CreateUrlRequest};
