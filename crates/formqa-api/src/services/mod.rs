mod ask;
mod upload;

pub use ask::AskService;
pub use upload::UploadService;
