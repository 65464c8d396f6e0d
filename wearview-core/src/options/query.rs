// File: wearview-core/src/options/query.rs
//
// One-time parse of a URL query string into a typed options record.
// Unknown parameters are ignored; unparsable values mean "not set".

use tracing::debug;
use url::form_urlencoded;

use wearview_common::models::{BodyShape, PreviewOptions};

/// Remaps the documented 0-100 zoom scale onto the renderer's 1.0-2.8
/// range. Unparsable or non-finite input yields `None`.
pub fn parse_zoom(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok().filter(|v: &f64| v.is_finite())?;
    Some(value.clamp(0.0, 100.0) * 1.8 / 100.0 + 1.0)
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse().ok().filter(|v: &f64| v.is_finite())
}

fn non_empty(value: std::borrow::Cow<'_, str>) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.into_owned())
    }
}

/// Parses a raw query string (with or without the leading `?`).
pub fn parse_query(query: &str) -> PreviewOptions {
    let mut options = PreviewOptions::default();
    let mut urns: Vec<String> = Vec::new();
    let mut urls: Vec<String> = Vec::new();
    let mut base64s: Vec<String> = Vec::new();

    let query = query.trim_start_matches('?');
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "contract" => options.contract_address = non_empty(value),
            "token" => options.token_id = non_empty(value),
            "item" => options.item_id = non_empty(value),
            "profile" => options.profile = non_empty(value),
            "skin" => options.skin = non_empty(value),
            "hair" => options.hair = non_empty(value),
            "eyes" => options.eyes = non_empty(value),
            "bodyShape" => options.body_shape = BodyShape::parse(&value),
            "urn" => {
                if !value.is_empty() {
                    urns.push(value.into_owned());
                }
            }
            "url" => {
                if !value.is_empty() {
                    urls.push(value.into_owned());
                }
            }
            "base64" => {
                if !value.is_empty() {
                    base64s.push(value.into_owned());
                }
            }
            "emote" => options.emote = value.parse().ok(),
            "camera" => options.camera = value.parse().ok(),
            "projection" => options.projection = value.parse().ok(),
            "zoom" => options.zoom = parse_zoom(Some(&value)),
            "offsetX" => options.offset_x = parse_float(&value),
            "offsetY" => options.offset_y = parse_float(&value),
            "offsetZ" => options.offset_z = parse_float(&value),
            "background" => options.background = non_empty(value),
            // Presence-only flag; any value counts.
            "transparentBackground" => options.transparent_background = Some(true),
            "env" => options.env = value.parse().ok(),
            "peerUrl" => options.peer_url = non_empty(value),
            "nftServerUrl" => options.nft_server_url = non_empty(value),
            other => debug!("Ignoring unknown query parameter: {other}"),
        }
    }

    if !urns.is_empty() {
        options.urns = Some(urns);
    }
    if !urls.is_empty() {
        options.urls = Some(urls);
    }
    if !base64s.is_empty() {
        options.base64s = Some(base64s);
    }
    options
}
