//! # Repository Pattern Implementation
//!
//! Record-side data access. The creator table lives in an external record
//! store; repositories here translate domain operations into
//! [`RecordStore`](bridge_traits::records::RecordStore) updates.

pub mod creator;

pub use creator::CreatorRecordUpdater;
