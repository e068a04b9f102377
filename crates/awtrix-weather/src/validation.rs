//! Shared input validation for the generator prompts and config loading.

use crate::message::Rgb;

/// A field failed its declared format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Port must be a number between 1 and 65535, got '{0}'")]
    Port(String),
    #[error("Please enter color as R,G,B (e.g., 255,0,0), got '{0}'")]
    ColorFormat(String),
    #[error("Color components must be between 0 and 255, got '{0}'")]
    ColorRange(String),
    #[error("Icon ID must be a number or empty, got '{0}'")]
    Icon(String),
    #[error("Duration must be a positive number of seconds, got '{0}'")]
    Duration(String),
    #[error("Please enter a text")]
    EmptyText,
    #[error("Broker host must not be empty")]
    EmptyHost,
    #[error("Topic prefix must be non-empty and must not contain '+' or '#', got '{0}'")]
    TopicPrefix(String),
    #[error("Topic '{0}' is used by more than one message")]
    DuplicateTopic(String),
    #[error("Weather URL must be an http:// or https:// URL, got '{0}'")]
    WeatherUrl(String),
    #[error("{field} must be greater than zero")]
    ZeroSeconds { field: &'static str },
    #[error("backoff_secs ({backoff}) must not be shorter than interval_secs ({interval})")]
    BackoffTooShort { backoff: u64, interval: u64 },
    #[error("keepalive_secs must be at most {max}, got {0}", max = u16::MAX)]
    KeepAlive(u64),
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a broker port: digits only, 1-65535.
pub fn parse_port(input: &str) -> Result<u16, ValidationError> {
    let input = input.trim();
    if !is_digits(input) {
        return Err(ValidationError::Port(input.to_string()));
    }
    match input.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ValidationError::Port(input.to_string())),
    }
}

/// Parse an `R,G,B` triple. Each component is 1-3 digits and at most 255.
pub fn parse_color(input: &str) -> Result<Rgb, ValidationError> {
    let input = input.trim();
    let parts: Vec<&str> = input.split(',').collect();
    if parts.len() != 3 || !parts.iter().all(|p| p.len() <= 3 && is_digits(p)) {
        return Err(ValidationError::ColorFormat(input.to_string()));
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        // At most three digits, so this cannot overflow u16.
        let value: u16 = part
            .parse()
            .map_err(|_| ValidationError::ColorFormat(input.to_string()))?;
        *slot = u8::try_from(value).map_err(|_| ValidationError::ColorRange(input.to_string()))?;
    }
    Ok(Rgb(rgb))
}

/// Parse an optional icon id. Empty input means "no icon".
pub fn parse_icon(input: &str) -> Result<Option<String>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    validate_icon(input)?;
    Ok(Some(input.to_string()))
}

/// An icon id, when present, is all ASCII digits.
pub fn validate_icon(icon: &str) -> Result<(), ValidationError> {
    if is_digits(icon) {
        Ok(())
    } else {
        Err(ValidationError::Icon(icon.to_string()))
    }
}

/// Parse a display duration in whole seconds, greater than zero.
pub fn parse_duration(input: &str) -> Result<u32, ValidationError> {
    let input = input.trim();
    if !is_digits(input) {
        return Err(ValidationError::Duration(input.to_string()));
    }
    match input.parse::<u32>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ValidationError::Duration(input.to_string())),
    }
}

/// Validate a topic prefix: non-empty, no MQTT wildcards.
pub fn validate_topic_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.trim_matches('/').is_empty() || prefix.contains(['+', '#']) {
        return Err(ValidationError::TopicPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Validate the weather endpoint: must parse as an http(s) URL.
pub fn validate_weather_url(url: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::WeatherUrl(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("1883"), Ok(1883));
        assert_eq!(parse_port("1"), Ok(1));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert_eq!(parse_port(" 1884 "), Ok(1884));
    }

    #[test]
    fn test_parse_port_invalid() {
        assert!(parse_port("").is_err());
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("-1").is_err());
        assert!(parse_port("18a3").is_err());
    }

    #[test]
    fn test_parse_color_accepts_boundaries() {
        assert_eq!(parse_color("0,0,0"), Ok(Rgb([0, 0, 0])));
        assert_eq!(parse_color("255,255,255"), Ok(Rgb([255, 255, 255])));
        assert_eq!(parse_color("255,0,128"), Ok(Rgb([255, 0, 128])));
    }

    #[test]
    fn test_parse_color_rejects_out_of_range() {
        assert_eq!(
            parse_color("256,0,0"),
            Err(ValidationError::ColorRange("256,0,0".to_string()))
        );
        assert!(matches!(
            parse_color("0,0,999"),
            Err(ValidationError::ColorRange(_))
        ));
    }

    #[test]
    fn test_parse_color_rejects_bad_shape() {
        for input in [
            "", "255,0", "255,0,0,0", "a,b,c", "1000,0,0", "-1,0,0", "255;0;0", "255,,0",
        ] {
            assert!(
                matches!(parse_color(input), Err(ValidationError::ColorFormat(_))),
                "expected format error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_icon() {
        assert_eq!(parse_icon(""), Ok(None));
        assert_eq!(parse_icon("   "), Ok(None));
        assert_eq!(parse_icon("16785"), Ok(Some("16785".to_string())));
        assert!(parse_icon("sun").is_err());
        assert!(parse_icon("12 3").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("5"), Ok(5));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("1.5").is_err());
        assert!(parse_duration("-3").is_err());
    }

    #[test]
    fn test_validate_topic_prefix() {
        assert!(validate_topic_prefix("awtrix/custom").is_ok());
        assert!(validate_topic_prefix("home/disp").is_ok());
        assert!(validate_topic_prefix("").is_err());
        assert!(validate_topic_prefix("/").is_err());
        assert!(validate_topic_prefix("awtrix/+").is_err());
        assert!(validate_topic_prefix("awtrix/#").is_err());
    }

    #[test]
    fn test_validate_weather_url() {
        assert!(validate_weather_url("https://wttr.in/50.0104,9.0294?format=j1").is_ok());
        assert!(validate_weather_url("http://127.0.0.1:8080/weather").is_ok());
        assert!(validate_weather_url("ftp://wttr.in/").is_err());
        assert!(validate_weather_url("wttr.in/Frankfurt").is_err());
    }
}
