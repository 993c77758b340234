pub mod combine;
pub mod download;
pub mod error;
pub mod logging;
pub mod options;

pub use combine::Combiner;
pub use download::DownloadClient;
pub use error::{Error, Result};
pub use options::Options;
