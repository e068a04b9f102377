//! Placeholder substitution into the config template.
//!
//! Every value is serialized as a YAML scalar before it is substituted, so
//! user text cannot change the structure of the rendered file.

use crate::config::DisplayConfig;

/// Template for the generated configuration file.
pub const CONFIG_TEMPLATE: &str = include_str!("../../templates/awtrix-weather.yaml.template");

/// Template variable substitution values
pub struct TemplateVars {
    pub os: String,
    pub broker_host: String,
    pub broker_port: String,
    pub topic_prefix: String,
    pub weather_url: String,
    pub messages: String,
}

impl TemplateVars {
    pub fn new(config: &DisplayConfig, os: &str) -> Self {
        Self {
            // Lives in a comment line, so only newlines need neutralizing.
            os: os.replace(['\r', '\n'], " "),
            broker_host: quoted(&config.broker.host),
            broker_port: config.broker.port.to_string(),
            topic_prefix: quoted(&config.broker.topic_prefix),
            weather_url: quoted(&config.weather_url),
            messages: render_messages(config),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        let value = match name {
            "os" => &self.os,
            "broker_host" => &self.broker_host,
            "broker_port" => &self.broker_port,
            "topic_prefix" => &self.topic_prefix,
            "weather_url" => &self.weather_url,
            "messages" => &self.messages,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// A double-quoted YAML scalar. JSON string syntax is valid YAML.
pub fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn render_messages(config: &DisplayConfig) -> String {
    if config.messages.is_empty() {
        return " []".to_string();
    }

    let mut out = String::new();
    for msg in &config.messages {
        let [r, g, b] = msg.color.0;
        out.push_str(&format!("\n  - text: {}", quoted(&msg.text)));
        if let Some(icon) = &msg.icon {
            out.push_str(&format!("\n    icon: {}", quoted(icon)));
        }
        out.push_str(&format!("\n    color: [{}, {}, {}]", r, g, b));
        out.push_str(&format!("\n    duration: {}", msg.duration));
        // Absent topics follow the prefix, even after it is edited.
        if let Some(topic) = &msg.topic {
            out.push_str(&format!("\n    topic: {}", quoted(topic)));
        }
    }
    out
}

/// Process template content, replacing all template variables.
///
/// Single pass over the template: substituted values are never rescanned,
/// and unknown `{{...}}` sequences are copied through unchanged.
pub fn process_template(content: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => match vars.lookup(&after[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render `config` into the config template.
pub fn render(config: &DisplayConfig, os: &str) -> String {
    process_template(CONFIG_TEMPLATE, &TemplateVars::new(config, os))
}
