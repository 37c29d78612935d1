// SPDX-License-Identifier: GPL-3.0-only

//! Semantic payload parsing
//!
//! Barcode text often carries structured content. This module parses
//! the closed set of payloads the pipeline understands: WiFi credential
//! codes, URLs, and plain text. Structured schemes outside that set
//! (tel:, mailto:, geo:, vCard) map to `Unknown`.

/// WiFi encryption type parsed from a WiFi QR code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiEncryption {
    /// Open network, no key
    Open,
    /// WEP (legacy)
    Wep,
    /// WPA/WPA2/WPA3 family
    Wpa,
}

impl WifiEncryption {
    /// Parse the `T:` field of a WiFi QR code
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WEP" => Self::Wep,
            "NOPASS" | "" => Self::Open,
            // WPA, WPA2, WPA3, SAE and enterprise variants
            _ => Self::Wpa,
        }
    }
}

/// Semantic payload of a decoded symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolPayload {
    /// WiFi network credentials (WIFI:S:<ssid>;T:<enc>;P:<key>;; format)
    Wifi {
        ssid: String,
        /// None for open networks
        password: Option<String>,
        encryption: WifiEncryption,
    },
    /// A browsable URL
    Url {
        /// Display title, when the content carries one
        title: Option<String>,
        url: String,
    },
    /// Unstructured text
    PlainText,
    /// Structured content outside the recognized set
    Unknown,
}

impl SymbolPayload {
    /// Parse symbol text into a payload
    ///
    /// Falls back to `PlainText` for unstructured content and `Unknown`
    /// for structured schemes the pipeline does not model.
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();

        // WiFi QR code format: WIFI:S:<ssid>;T:<security>;P:<password>;;
        if trimmed.starts_with("WIFI:") {
            return Self::parse_wifi(trimmed);
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Self::Url {
                title: None,
                url: trimmed.to_string(),
            };
        }

        // MEBKM bookmark format carries a title alongside the URL
        if trimmed.starts_with("MEBKM:") {
            return Self::parse_bookmark(trimmed);
        }

        // Other URI schemes and structured blocks are out of the
        // recognized set
        if is_structured(trimmed) {
            return Self::Unknown;
        }

        Self::PlainText
    }

    /// Parse the WIFI: credential format
    fn parse_wifi(content: &str) -> Self {
        let mut ssid = String::new();
        let mut password = None;
        let mut encryption = WifiEncryption::Open;

        let content = content.strip_prefix("WIFI:").unwrap_or(content);
        let content = content.trim_end_matches(';');

        // Fields may appear in any order: T:WPA;S:network;P:password
        for part in split_escaped(content, ';') {
            if let Some((key, value)) = part.split_once(':') {
                let value = unescape(value);
                match key {
                    "S" => ssid = value,
                    "P" => password = Some(value),
                    "T" => encryption = WifiEncryption::parse(&value),
                    _ => {}
                }
            }
        }

        if encryption == WifiEncryption::Open {
            password = None;
        }

        Self::Wifi {
            ssid,
            password,
            encryption,
        }
    }

    /// Parse the MEBKM:TITLE:<title>;URL:<url>;; bookmark format
    fn parse_bookmark(content: &str) -> Self {
        let mut title = None;
        let mut url = String::new();

        let content = content.strip_prefix("MEBKM:").unwrap_or(content);
        let content = content.trim_end_matches(';');

        for part in split_escaped(content, ';') {
            if let Some((key, value)) = part.split_once(':') {
                let value = unescape(value);
                match key.to_uppercase().as_str() {
                    "TITLE" => title = Some(value),
                    "URL" => url = value,
                    _ => {}
                }
            }
        }

        if url.is_empty() {
            return Self::Unknown;
        }

        Self::Url { title, url }
    }
}

/// Whether content looks like a structured scheme or block we don't model
fn is_structured(content: &str) -> bool {
    const PREFIXES: [&str; 8] = [
        "tel:",
        "mailto:",
        "sms:",
        "smsto:",
        "geo:",
        "BEGIN:VCARD",
        "BEGIN:VCALENDAR",
        "BEGIN:VEVENT",
    ];
    PREFIXES.iter().any(|p| content.starts_with(p))
}

/// Split on `sep`, honoring backslash escapes
fn split_escaped(content: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&content[start..i]);
            start = i + sep.len_utf8();
        }
    }
    parts.push(&content[start..]);
    parts
}

/// Resolve backslash escapes used in WiFi/bookmark QR fields
fn unescape(value: &str) -> String {
    value
        .replace("\\;", ";")
        .replace("\\:", ":")
        .replace("\\,", ",")
        .replace("\\\\", "\\")
}
