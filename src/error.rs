use rdkafka::error::KafkaError;

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("broker list is empty")]
    EmptyBrokers,
    #[error("topic is empty")]
    EmptyTopic,
    #[error("failed to create kafka producer: {0}")]
    Client(#[from] KafkaError),
    #[error("failed to deliver message to topic {topic}: {source}")]
    Delivery { topic: String, source: KafkaError },
    #[error("failed to flush kafka producer: {0}")]
    Flush(KafkaError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to create rolling log writer: {0}")]
    Writer(#[from] tracing_appender::rolling::InitError),
    #[error("a global logger is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::dispatcher::SetGlobalDefaultError),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value} for environment variable {name}")]
    Invalid { name: &'static str, value: String },
}
