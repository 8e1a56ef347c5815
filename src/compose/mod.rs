// Compose module - Upload-then-submit intents for posts and replies

mod composer;

pub use composer::Composer;
