mod ask;
mod export;
mod health;
mod session;
mod upload;

pub use ask::handle_ask;
pub use export::{download_corpus, download_export};
pub use health::health_check;
pub use session::session_status;
pub use upload::handle_upload;
