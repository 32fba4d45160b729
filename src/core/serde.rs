use serde::{Serialize, Deserialize, Serializer, Deserializer};
use std::time::Duration;

/// Serializes Duration as seconds
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.as_secs_f64().serialize(serializer)
}

/// Deserializes Duration from seconds
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(serialize_with = "serialize_duration")]
        #[serde(deserialize_with = "deserialize_duration")]
        timeout: Duration,
    }

    #[test]
    fn test_duration_serialization() {
        let original = Test {
            timeout: Duration::from_millis(2500),
        };

        let serialized = serde_json::to_string(&original).unwrap();
        assert_eq!(serialized, r#"{"timeout":2.5}"#);

        let deserialized: Test = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.timeout, original.timeout);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result: Result<Test, _> = serde_json::from_str(r#"{"timeout":-1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sniffer_config_from_json() {
        use crate::core::SnifferConfig;

        let config: SnifferConfig = serde_json::from_str(
            r#"{"port":"/dev/ttyACM0","baud_rate":921600,
                "session":{"response_timeout":2.0,"poll_interval":0.005}}"#,
        )
        .unwrap();
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 921_600);
        assert_eq!(config.session.response_timeout, Duration::from_secs(2));
        assert_eq!(config.session.poll_interval, Duration::from_millis(5));

        // Session block is optional
        let config: SnifferConfig =
            serde_json::from_str(r#"{"port":"COM90","baud_rate":3000000}"#).unwrap();
        assert_eq!(config.session, Default::default());
    }
}
