//! English → German weather condition strings for the display.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Known wttr.in condition strings and their display text.
pub const CONDITIONS: &[(&str, &str)] = &[
    ("Partly cloudy", "Teilweise bewölkt"),
    ("Sunny", "Sonnig"),
    ("Clear", "Klar"),
    ("Cloudy", "Bewölkt"),
    ("Overcast", "Bedeckt"),
    ("Light rain", "Leichter Regen"),
    ("Moderate rain", "Mäßiger Regen"),
    ("Heavy Rain Shower", "Starker Regen"),
    (
        "Heavy rain shower, thunderstorm in vicinity",
        "Starker Regen, Gewitter in der Nähe",
    ),
    ("Snow", "Schnee"),
    ("Thunderstorm", "Gewitter"),
    ("Drizzle", "Nieselregen"),
    ("Mist", "Nebel"),
    ("Fog", "Nebel"),
    ("Haze", "Dunst"),
    ("Dust", "Staub"),
    ("Sand", "Sand"),
    ("Squalls", "Windböen"),
    ("Tornado", "Tornado"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| CONDITIONS.iter().copied().collect());

/// Translate a condition string. Unknown input is returned unchanged.
pub fn translate(text: &str) -> &str {
    TABLE.get(text).copied().unwrap_or(text)
}
