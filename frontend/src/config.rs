//! 前端配置装配
//!
//! 优先级：默认值 < 构建时环境变量 < LocalStorage 中的 JSON 覆盖。

use crate::web::storage::read_json;
use seatrack::config::ClientConfig;

/// LocalStorage 中配置覆盖的键
pub const CONFIG_STORAGE_KEY: &str = "seatrack_config";

fn build_time_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(project_id) = option_env!("SEATRACK_PROJECT_ID") {
        config.backend.project_id = project_id.to_string();
    }
    if let Some(api_key) = option_env!("SEATRACK_API_KEY") {
        config.backend.api_key = api_key.to_string();
    }
    if let Some(api_key) = option_env!("SEATRACK_WEATHER_API_KEY") {
        config.weather.api_key = api_key.to_string();
    }
    config
}

pub fn load_config() -> ClientConfig {
    let config = build_time_config();
    let Some(patch) = read_json(CONFIG_STORAGE_KEY) else {
        return config;
    };
    match config.merged(patch) {
        Ok(merged) => merged,
        Err(e) => {
            log::warn!("[Config] ignoring `{}` override: {}", CONFIG_STORAGE_KEY, e);
            config
        }
    }
}
