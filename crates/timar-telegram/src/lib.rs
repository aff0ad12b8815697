// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram gateway for timar.
//!
//! Long-polls the Bot API via teloxide, converts messages and callback
//! queries into channel-agnostic [`InboundEvent`]s, and implements
//! [`MessagingGateway`] for outbound sends and in-place edits.

pub mod handler;

use async_trait::async_trait;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use timar_config::model::TelegramConfig;
use timar_core::{InboundEvent, Keyboard, MessageRef, MessagingGateway, TimarError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram gateway backed by teloxide long polling.
///
/// Inbound updates are pushed onto an mpsc channel by the polling task;
/// the dispatcher drains them through [`TelegramGateway::recv`].
pub struct TelegramGateway {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramGateway {
    /// Creates a gateway from config. Requires a non-empty
    /// `telegram.bot_token`; honors `telegram.api_url` when set.
    pub fn new(config: &TelegramConfig) -> Result<Self, TimarError> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TimarError::Config("telegram.bot_token is required to serve".into())
            })?;

        let mut bot = Bot::new(token);
        if let Some(api_url) = config.api_url.as_deref().filter(|u| !u.is_empty()) {
            let parsed = url::Url::parse(api_url)
                .map_err(|e| TimarError::Config(format!("telegram.api_url is invalid: {e}")))?;
            bot = bot.set_api_url(parsed);
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Starts the long-polling task. Idempotent.
    pub fn connect(&mut self) {
        if self.polling_handle.is_some() {
            return;
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let tree = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = msg_tx.clone();
                    async move {
                        match handler::text_event(&msg) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    warn!("inbound channel closed, dropping message");
                                }
                            }
                            None => {
                                debug!(msg_id = msg.id.0, "ignoring non-text message");
                            }
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = cb_tx.clone();
                        async move {
                            // Stop the client-side spinner whatever happens next.
                            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                                debug!(error = %e, "failed to answer callback query");
                            }
                            match handler::callback_event(&query) {
                                Some(event) => {
                                    if tx.send(event).await.is_err() {
                                        warn!("inbound channel closed, dropping callback");
                                    }
                                }
                                None => {
                                    debug!("ignoring callback query without data");
                                }
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, tree)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
    }

    /// Receives the next inbound event from the polling task.
    pub async fn recv(&self) -> Result<InboundEvent, TimarError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| TimarError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    /// Stops the polling task.
    pub fn disconnect(&mut self) {
        if let Some(handle) = self.polling_handle.take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, TimarError> {
        let mut request = self.bot.send_message(Recipient::Id(ChatId(chat_id)), text);
        if let Some(keyboard) = &keyboard {
            request = request.reply_markup(handler::keyboard_markup(keyboard));
        }
        let sent = request.await.map_err(|e| TimarError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageRef {
            chat_id,
            message_id: sent.id.0,
        })
    }

    async fn edit_message(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TimarError> {
        let mut request = self.bot.edit_message_text(
            ChatId(target.chat_id),
            teloxide::types::MessageId(target.message_id),
            text,
        );
        if let Some(keyboard) = &keyboard {
            request = request.reply_markup(handler::keyboard_markup(keyboard));
        }

        match request.await {
            Ok(_) => Ok(()),
            // Identical content is a no-op, not a failure. The refresh job
            // hits this whenever two ticks render the same second.
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(TimarError::Channel {
                message: format!("failed to edit message: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, api_url: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(String::from),
            api_url: api_url.map(String::from),
            admin_chat_id: None,
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramGateway::new(&config(None, None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramGateway::new(&config(Some(""), None)).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let cfg = config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11"), None);
        assert!(TelegramGateway::new(&cfg).is_ok());
    }

    #[test]
    fn new_honors_api_url_override() {
        let cfg = config(Some("123:abc"), Some("http://localhost:8081"));
        assert!(TelegramGateway::new(&cfg).is_ok());
    }

    #[test]
    fn new_rejects_malformed_api_url() {
        let cfg = config(Some("123:abc"), Some("not a url"));
        assert!(TelegramGateway::new(&cfg).is_err());
    }
}
