//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the resize proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Upstream origin holding the original, unresized assets.
    pub origin: OriginConfig,

    /// Origin fetch limits and timeouts.
    pub fetch: FetchConfig,

    /// Imaging backend selection and compatibility knobs.
    pub imaging: ImagingConfig,

    /// Cache header policy for composed responses.
    pub cache: CacheConfig,

    /// Per-deployment route variant flags.
    pub routes: RouteOptions,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            request_timeout_secs: 30,
        }
    }
}

/// Upstream origin configuration.
///
/// The origin is addressed virtual-host style: the `Host` header carries
/// `host` while the connection may be pinned to `resolve` addresses, which
/// supports object stores that route on the logical hostname.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Scheme used to reach the origin ("http" or "https").
    pub protocol: String,

    /// Logical origin hostname, also sent as the `Host` header.
    pub host: String,

    /// Origin port.
    pub port: u16,

    /// Path prefix prepended to every resolved asset path.
    pub base_path: String,

    /// Addresses the origin hostname resolves to, bypassing system DNS.
    /// Empty means: use system DNS.
    pub resolve: Vec<String>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 80,
            base_path: String::new(),
            resolve: Vec::new(),
        }
    }
}

/// Origin fetch limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total per-fetch timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum origin fetches in flight at once.
    pub max_in_flight: usize,

    /// Largest origin body the transform path will buffer, in bytes.
    /// Passthrough responses stream and are not subject to this limit.
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_in_flight: 128,
            max_body_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Imaging backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// Engine selector carried in directives (e.g., "gd").
    pub engine: String,

    /// JPEG encode quality (1-100).
    pub quality: u8,

    /// Emit directive canvas colors with inverted alpha bytes.
    ///
    /// Compatibility shim for a legacy backend version that rendered canvas
    /// alpha inverted (`ffffff00` meant opaque white). Applies only to the
    /// directive wire syntax, never to in-process rendering.
    pub invert_pad_alpha: bool,

    /// Upper bound on decoded source pixels (width * height), a guard
    /// against decompression bombs.
    pub max_pixels: u64,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            engine: "gd".to_string(),
            quality: 90,
            invert_pad_alpha: false,
            max_pixels: 100_000_000,
        }
    }
}

/// Cache header policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expiration policy for composed (resize/info) responses:
    /// "max" (far-future, the default — resized CDN assets are immutable
    /// per fingerprinted URL), "off", or a number of seconds.
    pub expires: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expires: "max".to_string(),
        }
    }
}

/// Route variant flags.
///
/// The rule table itself is fixed; these flags enable the rules that only
/// some deployments carry, replacing the per-variant config copies the
/// legacy setup maintained.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Enable the `/product/<sku>_<n><ext>` SKU rewrite rule.
    pub product_rewrite: bool,

    /// Enable the raw `/small_light(...)/` directive escape hatch.
    pub raw_directive: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            product_rewrite: true,
            raw_directive: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
