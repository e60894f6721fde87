//! 客户端配置
//!
//! 所有字段都有默认值；前端可以用一份 JSON 覆盖其中的一部分。

use seatrack_shared::{Coordinate, FALLBACK_COORDINATE};
use serde::{Deserialize, Serialize};

// =========================================================
// 默认值
// =========================================================

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SECURE_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_LANGUAGE: &str = "fr";
pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 6000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 托管的身份服务与文档存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
    pub identity_base_url: String,
    /// 用 refresh token 换取新 id token 的服务
    pub secure_token_base_url: String,
    pub firestore_base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            secure_token_base_url: DEFAULT_SECURE_TOKEN_BASE_URL.to_string(),
            firestore_base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    pub units: String,
    pub language: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: String::new(),
            units: DEFAULT_UNITS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// 定位失败时的地图中心
    pub fallback: Coordinate,
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_COORDINATE,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub weather: WeatherConfig,
    pub map: MapConfig,
    /// 提示条自动消失的时间
    pub notice_duration_ms: u64,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            weather: WeatherConfig::default(),
            map: MapConfig::default(),
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// 用 JSON 覆盖默认值，缺失的键保持默认
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 把一份 JSON 覆盖合并到当前配置上（逐层合并对象，其余值直接替换）
    pub fn merged(&self, patch: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);
        serde_json::from_value(base)
    }

    /// 返回缺失的必需项，供启动时记录日志
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.backend.project_id.trim().is_empty() {
            missing.push("backend.project_id");
        }
        if self.backend.api_key.trim().is_empty() {
            missing.push("backend.api_key");
        }
        if self.weather.api_key.trim().is_empty() {
            missing.push("weather.api_key");
        }
        missing
    }
}

fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = ClientConfig::from_json(
            r#"{ "weather": { "api_key": "abc" }, "map": { "zoom": 10 } }"#,
        )
        .unwrap();

        assert_eq!(config.weather.api_key, "abc");
        assert_eq!(config.weather.units, "metric");
        assert_eq!(config.weather.language, "fr");
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.map.fallback, FALLBACK_COORDINATE);
        assert_eq!(config.notice_duration_ms, 6000);
        assert_eq!(config.missing_keys(), vec!["backend.project_id", "backend.api_key"]);
    }

    #[test]
    fn test_merge_keeps_earlier_layers() {
        let mut built = ClientConfig::default();
        built.backend.project_id = "seatrack-prod".into();
        built.weather.api_key = "build-key".into();

        let merged = built
            .merged(serde_json::json!({ "weather": { "language": "en" }, "log_level": "debug" }))
            .unwrap();

        assert_eq!(merged.backend.project_id, "seatrack-prod");
        assert_eq!(merged.weather.api_key, "build-key");
        assert_eq!(merged.weather.language, "en");
        assert_eq!(merged.log_level, "debug");
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(ClientConfig::from_json("{ not json").is_err());
    }
}
