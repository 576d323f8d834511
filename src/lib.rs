//! Multi-agent eBook generation: negotiate a concept, write chapters, lay out
//! a contents page and a cover, then render and merge everything to PDF.

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod server;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{BookError, Result};
pub use services::book::{BookMaker, BookOutput};
