pub mod toml_loader;

pub use toml_loader::{load_all_paper_requests, load_paper_request};
