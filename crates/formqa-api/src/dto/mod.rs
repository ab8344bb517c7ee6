mod request;
mod response;

pub use request::AskRequest;
pub use response::{AskResponse, ExportLink, HealthResponse, SessionResponse};
