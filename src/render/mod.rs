// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render-service request building.
//!
//! Rendering happens on an external PlantUML server, only for preview, never
//! on the edit/validate/save path. This module builds the request description
//! and leaves transport to the host; no HTTP client is linked here.

use std::fmt;

pub const DEFAULT_RENDER_BASE_URL: &str = "https://www.plantuml.com/plantuml";

/// Keep GET urls comfortably below common proxy/server limits; longer sources
/// go over POST.
const MAX_GET_URL_LEN: usize = 4000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl RenderFormat {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMethod {
    Get,
    Post,
}

impl RenderMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully described HTTP request for the render server. `body` is `None` for
/// GET requests (the source travels hex-encoded in the url).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub method: RenderMethod,
    pub url: String,
    pub content_type: Option<&'static str>,
    pub body: Option<String>,
}

/// Build a request for rendering `source`, preferring GET and falling back to
/// POST when the encoded url would grow too long.
pub fn render_request(base_url: &str, format: RenderFormat, source: &str) -> RenderRequest {
    let get = get_request(base_url, format, source);
    if get.url.len() <= MAX_GET_URL_LEN {
        get
    } else {
        post_request(base_url, format, source)
    }
}

/// `GET <base>/<format>/~h<hex>` — the server's hex transport, chosen over
/// the deflate one so the url stays debuggable by eye.
pub fn get_request(base_url: &str, format: RenderFormat, source: &str) -> RenderRequest {
    let mut hex = String::with_capacity(source.len() * 2);
    for byte in source.bytes() {
        hex.push_str(&format!("{byte:02x}"));
    }
    RenderRequest {
        method: RenderMethod::Get,
        url: format!(
            "{}/{}/~h{hex}",
            base_url.trim_end_matches('/'),
            format.path_segment()
        ),
        content_type: None,
        body: None,
    }
}

/// `POST <base>/<format>` with the raw source as the body.
pub fn post_request(base_url: &str, format: RenderFormat, source: &str) -> RenderRequest {
    RenderRequest {
        method: RenderMethod::Post,
        url: format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            format.path_segment()
        ),
        content_type: Some("text/plain; charset=utf-8"),
        body: Some(source.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        get_request, render_request, RenderFormat, RenderMethod, DEFAULT_RENDER_BASE_URL,
    };

    #[test]
    fn get_url_hex_encodes_the_source() {
        let request = get_request(DEFAULT_RENDER_BASE_URL, RenderFormat::Svg, "@startuml");
        assert_eq!(request.method, RenderMethod::Get);
        assert_eq!(
            request.url,
            "https://www.plantuml.com/plantuml/svg/~h407374617274756d6c"
        );
        assert_eq!(request.body, None);
    }

    #[test]
    fn trailing_slash_on_the_base_url_is_tolerated() {
        let request = get_request("http://localhost:8080/", RenderFormat::Png, "x");
        assert_eq!(request.url, "http://localhost:8080/png/~h78");
    }

    #[test]
    fn long_sources_fall_back_to_post() {
        let source = "@startuml\n".repeat(500);
        let request = render_request(DEFAULT_RENDER_BASE_URL, RenderFormat::Svg, &source);
        assert_eq!(request.method, RenderMethod::Post);
        assert_eq!(request.url, "https://www.plantuml.com/plantuml/svg");
        assert_eq!(request.body.as_deref(), Some(source.as_str()));
        assert_eq!(request.content_type, Some("text/plain; charset=utf-8"));
    }
}
