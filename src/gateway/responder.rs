use std::sync::Arc;

use serenity::all::{
    CommandInteraction, CreateAttachment, CreateInteractionResponseFollowup, EditInteractionResponse, Http,
};
use tracing::debug;

use crate::commands::Responder;
use crate::error::Result;
use crate::types::Reply;

/// Replies for one interaction: deferred acknowledgement, then follow-ups.
pub struct InteractionResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

impl InteractionResponder {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self { http, interaction }
    }
}

/// Follow-up message for `reply`. Empty content is left out so attachment-only posts stay bare.
fn followup(reply: Reply) -> CreateInteractionResponseFollowup {
    let mut message = CreateInteractionResponseFollowup::new();
    if !reply.content.is_empty() {
        message = message.content(reply.content);
    }
    if let Some(attachment) = reply.attachment {
        debug!(
            file = %attachment.file_name,
            content_type = attachment.content_type,
            size = attachment.bytes.len(),
            "attaching file to follow-up"
        );
        message = message.add_file(CreateAttachment::bytes(attachment.bytes, attachment.file_name));
    }
    message
}

impl Responder for InteractionResponder {
    async fn acknowledge(&self) -> Result<()> {
        self.interaction.defer(self.http.as_ref()).await?;
        debug!(interaction = %self.interaction.id, "interaction deferred");
        Ok(())
    }

    async fn send(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_followup(self.http.as_ref(), followup(reply))
            .await?;
        Ok(())
    }

    async fn edit_original(&self, content: &str) -> Result<()> {
        self.interaction
            .edit_response(self.http.as_ref(), EditInteractionResponse::new().content(content))
            .await?;
        Ok(())
    }
}
