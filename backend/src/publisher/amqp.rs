//! RabbitMQ event publisher.
//!
//! One connection and one channel are opened at startup and shared by every
//! request. Each event is published to the default exchange with the queue
//! name as routing key, as a persistent `application/json` message, and the
//! broker's publisher confirmation is awaited before reporting success.

use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::Mutex;
use tracing::info;

use super::error::{PublishError, PublishResult};
use super::{encode_event, EventPublisher};
use crate::config::PublisherSettings;
use crate::models::LogEvent;

/// AMQP delivery mode that makes the broker write the message to disk.
const PERSISTENT_DELIVERY_MODE: u8 = 2;
/// AMQP reply code for a normal close.
const REPLY_SUCCESS: u16 = 200;

pub struct AmqpPublisher {
    connection: Connection,
    /// The channel is not used concurrently: one publish holds the lock
    /// from send until confirmation.
    channel: Mutex<Channel>,
    queue: String,
}

impl AmqpPublisher {
    /// Connect to the broker and declare the durable event queue.
    ///
    /// # Errors
    /// Returns an error if the connection, channel, confirm mode or queue
    /// declaration fails.
    pub async fn connect(settings: &PublisherSettings) -> PublishResult<Self> {
        let connection = Connection::connect(&settings.amqp_uri(), ConnectionProperties::default())
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublishError::Channel(e.to_string()))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| PublishError::Channel(e.to_string()))?;

        channel
            .queue_declare(
                &settings.queue,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::QueueDeclare {
                queue: settings.queue.clone(),
                message: e.to_string(),
            })?;

        info!(
            host = %settings.host,
            port = settings.port,
            queue = %settings.queue,
            "Connected to RabbitMQ"
        );

        Ok(Self {
            connection,
            channel: Mutex::new(channel),
            queue: settings.queue.clone(),
        })
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    fn kind(&self) -> &'static str {
        "amqp"
    }

    async fn publish(&self, event: &LogEvent) -> PublishResult<()> {
        let payload = encode_event(event)?;

        let channel = self.channel.lock().await;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT_DELIVERY_MODE);

        let confirm = channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        let confirmation = confirm
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        if confirmation.is_nack() {
            return Err(PublishError::NotConfirmed);
        }
        Ok(())
    }

    async fn close(&self) -> PublishResult<()> {
        let channel = self.channel.lock().await;
        channel
            .close(REPLY_SUCCESS, "shutdown")
            .await
            .map_err(|e| PublishError::Channel(e.to_string()))?;

        self.connection
            .close(REPLY_SUCCESS, "shutdown")
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        info!(queue = %self.queue, "RabbitMQ connection closed");
        Ok(())
    }
}
