use rdkafka::ClientConfig;
use serde::{Deserialize, Serialize};

/// Client level reliability settings passed through to librdkafka.
/// The defaults wait for every in-sync replica to acknowledge a message
/// and retry delivery up to 10 times before giving up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerSettings {
    pub acks: String,
    pub retries: String,
    pub message_timeout: String,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            acks: "all".to_string(),
            retries: "10".to_string(),
            message_timeout: "30000".to_string(),
        }
    }
}

/// Connection details for the kafka producer facade: where to connect and
/// which topic every payload is published to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    #[serde(default)]
    pub settings: ProducerSettings,
}

impl ProducerConfig {
    pub fn new(brokers: Vec<String>, topic: String) -> Self {
        Self {
            brokers,
            topic,
            settings: ProducerSettings::default(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.brokers.join(","))
            .set("acks", &self.settings.acks)
            .set("retries", &self.settings.retries)
            .set("message.timeout.ms", &self.settings.message_timeout);
        config
    }
}

#[cfg(test)]
mod tests {
    use crate::configuration::kafka::ProducerConfig;

    #[test]
    fn it_applies_default_reliability_settings() {
        let config = ProducerConfig::new(vec!["localhost:9092".to_string()], "orders".to_string());
        let client_config = config.client_config();
        assert_eq!(client_config.get("acks"), Some("all"));
        assert_eq!(client_config.get("retries"), Some("10"));
        assert_eq!(client_config.get("message.timeout.ms"), Some("30000"));
    }

    #[test]
    fn it_joins_brokers_into_bootstrap_servers() {
        let config = ProducerConfig::new(
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()],
            "orders".to_string(),
        );
        let client_config = config.client_config();
        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
    }
}
