/// Contains the caller populated configuration structs for both facades.
pub mod configuration;
/// Contains the error enums returned by the producer and logging facades.
pub mod error;
/// Contains the long-lived producer and logger handles built from the configuration.
pub mod services;
