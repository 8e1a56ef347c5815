// Media module - Content-addressed attachments
// Content identifiers, upload collaborator contract, and gateway URLs

mod cid;
mod uploader;

pub use cid::{gateway_url, ContentId, ContentIdError, DEFAULT_GATEWAY};
pub use uploader::{ContentUploader, MediaBlob, MockContentUploader, UploadError};
