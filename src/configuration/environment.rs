use dotenv::dotenv;

use crate::configuration::kafka::ProducerConfig;
use crate::configuration::logs::LogConfiguration;
use crate::error::EnvironmentError;

/// Everything the embedding application can configure through the
/// environment, loaded in one pass.
pub struct EnvironmentProperties {
    pub producer: ProducerConfig,
    pub logging: LogConfiguration,
}

impl EnvironmentProperties {
    pub fn load() -> Result<EnvironmentProperties, EnvironmentError> {
        dotenv().ok();
        Ok(EnvironmentProperties {
            producer: ProducerConfig::from_env()?,
            logging: LogConfiguration::from_env()?,
        })
    }
}

impl ProducerConfig {
    pub fn from_env() -> Result<ProducerConfig, EnvironmentError> {
        let brokers = required("KAFKA_BROKER_ADDRESS")?
            .split(',')
            .map(|broker| broker.trim().to_string())
            .filter(|broker| !broker.is_empty())
            .collect();
        let topic = required("KAFKA_TOPIC")?;
        Ok(ProducerConfig::new(brokers, topic))
    }
}

impl LogConfiguration {
    pub fn from_env() -> Result<LogConfiguration, EnvironmentError> {
        let mut config = LogConfiguration {
            environment: optional("ENVIRONMENT"),
            service_name: optional("SERVICE_NAME"),
            log_path: optional("LOG_PATH"),
            level: optional("LOG_LEVEL"),
            format: optional("LOG_FORMAT"),
            mode: optional("LOG_MODE"),
            ..LogConfiguration::default()
        };
        if let Ok(max_age) = std::env::var("LOG_MAX_AGE_DAYS") {
            config.max_age_days =
                max_age
                    .parse()
                    .map_err(|_| EnvironmentError::Invalid {
                        name: "LOG_MAX_AGE_DAYS",
                        value: max_age,
                    })?;
        }
        Ok(config)
    }
}

fn required(name: &'static str) -> Result<String, EnvironmentError> {
    std::env::var(name).map_err(|_| EnvironmentError::Missing(name))
}

fn optional(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::configuration::environment::EnvironmentProperties;

    #[test]
    fn it_loads_producer_and_logging_settings_from_the_environment() {
        std::env::set_var("KAFKA_BROKER_ADDRESS", "kafka-1:9092, kafka-2:9092");
        std::env::set_var("KAFKA_TOPIC", "orders");
        std::env::set_var("LOG_LEVEL", "warning");
        std::env::set_var("LOG_MAX_AGE_DAYS", "14");

        let properties = EnvironmentProperties::load().unwrap();
        assert_eq!(
            properties.producer.brokers,
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()]
        );
        assert_eq!(properties.producer.topic, "orders");
        assert_eq!(properties.logging.level, "warning");
        assert_eq!(properties.logging.max_age_days, 14);
    }
}
