//! MQTT transport (rumqttc)
//!
//! Subscribes to every registry topic on each (re)connection and forwards
//! publishes to the ingestion channel. Delivery is QoS 0: at most once,
//! best effort.

use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode,
};
use tokio::sync::{mpsc, watch};

use super::InboundMessage;
use crate::error::TransportError;
use crate::shutdown::signalled;
use crate::topics::TopicRegistry;

/// Delay before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on flushing the DISCONNECT packet at shutdown
const DISCONNECT_FLUSH: Duration = Duration::from_secs(1);

/// Broker connection settings
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "traffic-monitor".to_string(),
            keep_alive: Duration::from_secs(30),
        }
    }
}

/// Subscriber side of the broker connection
pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Vec<String>,
}

impl MqttTransport {
    pub fn new(settings: &MqttSettings, registry: &TopicRegistry) -> Self {
        let mut options = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        options.set_keep_alive(settings.keep_alive);

        let topics: Vec<String> = registry.subscriptions().map(str::to_string).collect();
        // Room for one SUBSCRIBE per topic plus DISCONNECT
        let (client, eventloop) = AsyncClient::new(options, topics.len() + 4);

        Self {
            client,
            eventloop,
            topics,
        }
    }

    /// Queue a SUBSCRIBE for every topic; failures are logged, not retried
    fn subscribe_all(&self) {
        for topic in &self.topics {
            match self.client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                Ok(()) => log::info!("Subscribed to {}", topic),
                Err(e) => {
                    let err = TransportError::Subscribe {
                        topic: topic.clone(),
                        reason: e.to_string(),
                    };
                    log::error!("{}", err);
                }
            }
        }
    }

    /// Poll the broker connection until shutdown, then disconnect
    pub async fn run(
        mut self,
        tx: mpsc::Sender<InboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = signalled(&mut shutdown) => break,

                event = self.eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        log::info!("✅ Connected to MQTT broker");
                        self.subscribe_all();
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        for code in &ack.return_codes {
                            if matches!(code, SubscribeReasonCode::Failure) {
                                log::error!("Broker rejected subscription (pkid {})", ack.pkid);
                            }
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let msg =
                            InboundMessage::new(publish.topic.clone(), publish.payload.to_vec());
                        if tx.send(msg).await.is_err() {
                            log::warn!("Ingestion channel closed, stopping transport");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::error!("{}", TransportError::Connection(e.to_string()));
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },
            }
        }

        self.disconnect().await;
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.client.try_disconnect() {
            log::warn!("Could not queue MQTT disconnect: {}", e);
            return;
        }

        let eventloop = &mut self.eventloop;
        let flushed = tokio::time::timeout(DISCONNECT_FLUSH, async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        match flushed {
            Ok(()) => log::info!("🔌 Disconnected from MQTT broker"),
            Err(_) => log::warn!("Timed out disconnecting from MQTT broker"),
        }
    }
}
