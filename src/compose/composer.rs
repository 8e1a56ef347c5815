// Composer - Turns a text + optional attachment into a contract write
//
// The attachment is uploaded first; a failed upload aborts the intent and
// nothing is submitted. Text is validated before the upload so an invalid
// intent never touches the network.

use crate::ledger::PostId;
use crate::media::{ContentId, ContentUploader, MediaBlob};
use crate::notify::{surface, Notice, Notifier};
use crate::tx::{TransactionManager, TxError, TxHash};
use std::sync::Arc;
use tracing::{info, warn};

/// Creates posts and replies with optional media
pub struct Composer {
    manager: Arc<TransactionManager>,
    uploader: Arc<dyn ContentUploader>,
    notifier: Arc<dyn Notifier>,
}

impl Composer {
    pub fn new(
        manager: Arc<TransactionManager>,
        uploader: Arc<dyn ContentUploader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            manager,
            uploader,
            notifier,
        }
    }

    pub fn manager(&self) -> &Arc<TransactionManager> {
        &self.manager
    }

    /// Publish a new post
    pub async fn publish_post(
        &self,
        content: &str,
        attachment: Option<MediaBlob>,
    ) -> Result<TxHash, TxError> {
        let media = self.prepare(content, attachment).await?;
        self.manager.submit_create_post(content, media).await
    }

    /// Reply to an existing post
    pub async fn reply(
        &self,
        post_id: PostId,
        content: &str,
        attachment: Option<MediaBlob>,
    ) -> Result<TxHash, TxError> {
        let media = self.prepare(content, attachment).await?;
        self.manager.submit_comment(post_id, content, media).await
    }

    /// Validate the text, then upload the attachment if there is one
    async fn prepare(
        &self,
        content: &str,
        attachment: Option<MediaBlob>,
    ) -> Result<Option<ContentId>, TxError> {
        if let Err(err) = self
            .manager
            .validator()
            .check_content(content, attachment.is_some())
        {
            let err = TxError::from(err);
            surface(self.notifier.as_ref(), &err);
            return Err(err);
        }

        let Some(blob) = attachment else {
            return Ok(None);
        };

        self.notifier
            .notify(Notice::pending("Uploading image to IPFS..."));

        match self.uploader.upload(&blob).await {
            Ok(cid) => {
                info!(%cid, bytes = blob.len(), media_type = blob.media_type(), "attachment uploaded");
                Ok(Some(cid))
            }
            Err(err) => {
                warn!(error = %err, "attachment upload failed, intent aborted");
                let err = TxError::from(err);
                surface(self.notifier.as_ref(), &err);
                Err(err)
            }
        }
    }
}
