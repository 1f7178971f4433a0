pub mod reconciler;
pub mod scraped;

pub use reconciler::{
    MetadataReconciler, NameFailure, NameReconciliation, ReconciledName, ScrapedReconciliation,
    StudioReconciliation,
};
pub use scraped::ScrapedMetadata;
