pub mod engine;
pub mod report;

pub use crate::domain::model::{
    ActionOutcome, ActionRecord, ImageFile, ProductPayload, RejectedRow, SourceListing,
    SourceProduct, SyncAction, SyncReport, TargetProduct,
};
pub use crate::domain::ports::{ConfigProvider, ImageFetcher, ProductSource, ProductTarget, Storage};
pub use crate::utils::error::Result;
