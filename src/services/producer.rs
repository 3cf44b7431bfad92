use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tracing::info;

use crate::configuration::kafka::ProducerConfig;
use crate::error::ProducerError;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Partition and offset assigned to a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Long-lived kafka producer facade.
///
/// The underlying client is built once in [`EventProducer::connect`] and
/// reused for every send; [`EventProducer::close`] flushes whatever is
/// still in flight before releasing the connection. Delivery failures come
/// back as error values, logging them is up to the caller.
pub struct EventProducer {
    topic: String,
    producer: FutureProducer,
}

impl EventProducer {
    pub fn connect(config: &ProducerConfig) -> Result<EventProducer, ProducerError> {
        if config.brokers.is_empty() {
            return Err(ProducerError::EmptyBrokers);
        }
        if config.topic.is_empty() {
            return Err(ProducerError::EmptyTopic);
        }
        let producer = config.client_config().create()?;
        Ok(EventProducer {
            topic: config.topic.clone(),
            producer,
        })
    }

    /// Publishes one string payload to the configured topic and waits for
    /// the acknowledgment dictated by the configured acks setting.
    pub async fn send(&self, payload: &str) -> Result<Delivery, ProducerError> {
        let record = FutureRecord::<(), str>::to(&self.topic).payload(payload);
        match self
            .producer
            .send(record, Timeout::After(SEND_TIMEOUT))
            .await
        {
            Ok((partition, offset)) => {
                info!(partition, offset, topic = %self.topic, "message delivered");
                Ok(Delivery { partition, offset })
            }
            Err((source, _)) => Err(ProducerError::Delivery {
                topic: self.topic.clone(),
                source,
            }),
        }
    }

    /// Flushes outstanding deliveries, then drops the client.
    pub fn close(self) -> Result<(), ProducerError> {
        self.producer
            .flush(Timeout::After(FLUSH_TIMEOUT))
            .map_err(ProducerError::Flush)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use crate::configuration::kafka::ProducerConfig;
    use crate::error::ProducerError;
    use crate::services::producer::EventProducer;

    #[test]
    fn it_rejects_an_empty_broker_list() {
        let config = ProducerConfig::new(vec![], "orders".to_string());
        let result = EventProducer::connect(&config);
        assert!(matches!(result, Err(ProducerError::EmptyBrokers)));
    }

    #[test]
    fn it_rejects_an_empty_topic() {
        let config = ProducerConfig::new(vec!["localhost:9092".to_string()], String::new());
        let result = EventProducer::connect(&config);
        assert!(matches!(result, Err(ProducerError::EmptyTopic)));
    }

    // client creation is lazy in librdkafka, no broker connection happens here
    #[test]
    fn it_builds_the_client_once_on_connect() {
        let config = ProducerConfig::new(vec!["localhost:9092".to_string()], "orders".to_string());
        let producer = EventProducer::connect(&config).unwrap();
        assert_eq!(producer.topic(), "orders");
    }
}
