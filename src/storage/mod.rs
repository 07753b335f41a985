pub mod images;
pub mod records;

pub use images::ImageStore;
pub use records::{JsonFileStore, RecordStore};
