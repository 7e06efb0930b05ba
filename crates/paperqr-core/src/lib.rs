pub mod config;
pub mod error;

pub use config::PaperConfig;
pub use error::{PaperError, PaperResult};
