use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::commands::{replies, Responder};
use crate::db::WheelRepository;
use crate::error::{AppError, Result};
use crate::render::WheelRenderer;
use crate::state::WheelStore;
use crate::types::{Attachment, CommandEvent, CommandName, Reply};
use crate::wheel::selector;

/// How a command ended, for health counters and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command ran and the user got its reply.
    Completed,
    /// Request refused (empty wheel, bad argument, wrong channel, ...). No state changed.
    Rejected,
    /// Storage, renderer or platform failure.
    Failed,
}

/// Routes one command to its wheel operation and replies.
pub struct CommandDispatcher<R, G> {
    store: Arc<WheelStore<R>>,
    renderer: G,
    /// Empty = commands accepted in any channel.
    channel_prefix: String,
    spin_result_delay: Duration,
}

impl<R: WheelRepository, G: WheelRenderer> CommandDispatcher<R, G> {
    pub fn new(
        store: Arc<WheelStore<R>>,
        renderer: G,
        channel_prefix: String,
        spin_result_delay: Duration,
    ) -> Self {
        Self { store, renderer, channel_prefix, spin_result_delay }
    }

    #[cfg(test)]
    pub fn store(&self) -> &Arc<WheelStore<R>> {
        &self.store
    }

    /// Run `event` to completion. Every failure is logged and reported to the user;
    /// nothing is retried.
    pub async fn handle<P: Responder>(&self, event: &CommandEvent, responder: &P) -> Outcome {
        match self.execute(event, responder).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_user_error() {
                    info!(command = %event.command, user = %event.user_name, "command rejected: {e}");
                } else {
                    error!(command = %event.command, user = %event.user_name, "command failed: {e}");
                }
                if let Err(send_err) = responder.send(Reply::text(e.user_message())).await {
                    error!(command = %event.command, "could not report failure to user: {send_err}");
                    return Outcome::Failed;
                }
                if e.is_user_error() {
                    Outcome::Rejected
                } else {
                    Outcome::Failed
                }
            }
        }
    }

    async fn execute<P: Responder>(&self, event: &CommandEvent, responder: &P) -> Result<Outcome> {
        if !self.channel_allowed(&event.channel_name) {
            responder.send(Reply::text(replies::wrong_channel(&self.channel_prefix))).await?;
            return Ok(Outcome::Rejected);
        }
        if let CommandName::Unknown(name) = &event.command {
            warn!(command = %name, "unknown command");
            responder.send(Reply::text(replies::UNKNOWN_COMMAND)).await?;
            return Ok(Outcome::Rejected);
        }

        let key = event.channel_key()?;
        let mut wheel = self.store.checkout(&key).await?;
        if event.command.requires_options() && wheel.options().is_empty() {
            return Err(AppError::EmptyWheel);
        }
        let user = event.user_name.as_str();

        match event.command {
            CommandName::Add => {
                let option = event.args.option.clone().ok_or_else(|| {
                    AppError::InvalidArgument(replies::ADD_MISSING_ARGUMENT.to_string())
                })?;
                wheel.options_mut().add(option.clone());
                let text = replies::added(user, &option, wheel.options());
                wheel.commit().await?;
                responder.send(Reply::text(text)).await?;
            }

            CommandName::Remove => {
                let removed = match (event.args.index, event.args.option.as_deref()) {
                    (Some(index), _) => wheel.try_mutate(|options| options.remove_at(index))?,
                    (None, Some(text)) => {
                        if !wheel.options().as_slice().iter().any(|o| o == text) {
                            responder.send(Reply::text(replies::not_on_wheel(text))).await?;
                            return Ok(Outcome::Rejected);
                        }
                        let count = wheel.options_mut().remove_value(text);
                        debug!(key = %key, option = text, count, "removed by value");
                        text.to_string()
                    }
                    (None, None) => {
                        return Err(AppError::InvalidArgument(
                            replies::REMOVE_MISSING_ARGUMENT.to_string(),
                        ))
                    }
                };
                let text = replies::removed(user, &removed, wheel.options());
                wheel.commit().await?;
                responder.send(Reply::text(text)).await?;
            }

            CommandName::Randomize => {
                {
                    let mut rng = rand::rng();
                    wheel.options_mut().randomize(&mut rng);
                }
                let options = wheel.options().clone();
                debug!(key = %key, count = options.len(), "wheel shuffled");

                // the new order is only stored once its preview exists
                let png = self.renderer.preview(options.as_slice()).await?;
                wheel.commit().await?;
                responder
                    .send(Reply::with_attachment(
                        replies::new_order(&options),
                        Attachment::png(replies::PREVIEW_FILE_NAME, png),
                    ))
                    .await?;
            }

            CommandName::Preview => {
                let options = wheel.options().clone();
                drop(wheel);

                let png = self.renderer.preview(options.as_slice()).await?;
                responder
                    .send(Reply::with_attachment(
                        replies::full_list(&options),
                        Attachment::png(replies::PREVIEW_FILE_NAME, png),
                    ))
                    .await?;
            }

            CommandName::Spin => {
                let options = wheel.options().clone().into_vec();
                drop(wheel);

                let selection = {
                    let mut rng = rand::rng();
                    selector::select(&mut rng, &options)?
                };
                debug!(
                    key = %key,
                    selected_index = selection.selected_index,
                    spin_degrees = selection.spin_degrees,
                    "spin selected"
                );

                let gif = self.renderer.animate(&options, &selection).await?;
                responder
                    .send(Reply::with_attachment(
                        String::new(),
                        Attachment::gif(replies::SPIN_FILE_NAME, gif),
                    ))
                    .await?;

                // let the animation finish before revealing the result
                tokio::time::sleep(self.spin_result_delay).await;
                responder.edit_original(&replies::winner(&selection.winner)).await?;
            }

            CommandName::Reset => {
                wheel.options_mut().clear();
                let text = replies::cleared(user, wheel.options());
                wheel.commit().await?;
                responder.send(Reply::text(text)).await?;
            }

            // answered before checkout
            CommandName::Unknown(_) => return Ok(Outcome::Rejected),
        }

        Ok(Outcome::Completed)
    }

    fn channel_allowed(&self, channel_name: &str) -> bool {
        if self.channel_prefix.is_empty() {
            return true;
        }
        channel_name
            .to_lowercase()
            .starts_with(&self.channel_prefix.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
