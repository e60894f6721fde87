//! 外部数据获取：设备定位、天气快照、地图中心
//!
//! 每次视图激活只获取一次，不重试、不缓存、不后台刷新。

mod weather;

pub use weather::OpenWeatherClient;

use crate::config::MapConfig;
use crate::error::{AppError, AppResult};
use seatrack_shared::{Coordinate, WeatherSnapshot};
use thiserror::Error;

// =========================================================
// 协作方接口
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("timed out")]
    Timeout,
    #[error("geolocation not supported")]
    Unsupported,
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::LocationUnavailable(e.to_string())
    }
}

/// 一次性定位，不做持续追踪
#[async_trait::async_trait(?Send)]
pub trait GeolocationProvider {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

#[async_trait::async_trait(?Send)]
pub trait WeatherProvider {
    async fn fetch(&self, position: Coordinate) -> AppResult<WeatherSnapshot>;
}

// =========================================================
// 天气视图
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherViewState {
    #[default]
    Loading,
    /// 阻塞错误状态，不显示任何天气数据
    Failed(AppError),
    Ready {
        position: Coordinate,
        snapshot: WeatherSnapshot,
    },
}

/// 先定位，再按坐标查询天气；任何一步失败都得到阻塞错误
pub async fn load_weather<G, W>(geolocation: &G, weather: &W) -> WeatherViewState
where
    G: GeolocationProvider + ?Sized,
    W: WeatherProvider + ?Sized,
{
    let position = match geolocation.current_position().await {
        Ok(position) => position,
        Err(e) => {
            log::warn!("[Weather] location unavailable: {}", e);
            return WeatherViewState::Failed(e.into());
        }
    };

    match weather.fetch(position).await {
        Ok(snapshot) => WeatherViewState::Ready { position, snapshot },
        Err(e) => {
            log::warn!("[Weather] fetch failed at {}: {}", position, e);
            WeatherViewState::Failed(e)
        }
    }
}

// =========================================================
// 地图视图
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Device,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewState {
    pub center: Coordinate,
    pub source: PositionSource,
    pub zoom: u8,
}

impl MapViewState {
    /// OpenStreetMap 嵌入地址，边界框由中心点和缩放级别推算
    pub fn embed_url(&self) -> String {
        let half_lon = 360.0 / f64::from(1u32 << self.zoom.min(19));
        let half_lat = half_lon / 2.0;
        let Coordinate {
            latitude,
            longitude,
        } = self.center;
        format!(
            "https://www.openstreetmap.org/export/embed.html?bbox={:.5}%2C{:.5}%2C{:.5}%2C{:.5}&layer=mapnik&marker={:.5}%2C{:.5}",
            longitude - half_lon,
            latitude - half_lat,
            longitude + half_lon,
            latitude + half_lat,
            latitude,
            longitude
        )
    }
}

/// 定位失败时退回固定坐标，地图始终可用
pub async fn resolve_map_view<G>(geolocation: &G, config: &MapConfig) -> MapViewState
where
    G: GeolocationProvider + ?Sized,
{
    match geolocation.current_position().await {
        Ok(center) => MapViewState {
            center,
            source: PositionSource::Device,
            zoom: config.zoom,
        },
        Err(e) => {
            log::info!(
                "[Map] location unavailable ({}), centering on {}",
                e,
                config.fallback
            );
            MapViewState {
                center: config.fallback,
                source: PositionSource::Fallback,
                zoom: config.zoom,
            }
        }
    }
}

/// “我的位置”按钮：重新定位，失败时保持当前视图
pub async fn recenter<G>(geolocation: &G, current: MapViewState) -> MapViewState
where
    G: GeolocationProvider + ?Sized,
{
    match geolocation.current_position().await {
        Ok(center) => MapViewState {
            center,
            source: PositionSource::Device,
            ..current
        },
        Err(e) => {
            log::warn!("[Map] recenter failed: {}", e);
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatrack_shared::FALLBACK_COORDINATE;
    use std::cell::{Cell, RefCell};

    struct ScriptedGeolocation {
        answers: RefCell<Vec<Result<Coordinate, LocationError>>>,
    }

    impl ScriptedGeolocation {
        fn new(answers: Vec<Result<Coordinate, LocationError>>) -> Self {
            Self {
                answers: RefCell::new(answers),
            }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl GeolocationProvider for ScriptedGeolocation {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            let mut answers = self.answers.borrow_mut();
            if answers.is_empty() {
                return Err(LocationError::Unavailable);
            }
            answers.remove(0)
        }
    }

    struct StubWeather {
        calls: Cell<usize>,
        fail: bool,
    }

    #[async_trait::async_trait(?Send)]
    impl WeatherProvider for StubWeather {
        async fn fetch(&self, _position: Coordinate) -> AppResult<WeatherSnapshot> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AppError::WeatherFetchFailed("status 500".into()));
            }
            Ok(WeatherSnapshot {
                temperature: 21.4,
                description: "peu nuageux".into(),
                humidity: 60.0,
                wind_speed: 3.0,
                pressure: 1012.0,
            })
        }
    }

    const BREST: Coordinate = Coordinate::new(48.3904, -4.4861);

    #[tokio::test]
    async fn test_weather_blocks_on_location_denial() {
        let geo = ScriptedGeolocation::new(vec![Err(LocationError::PermissionDenied)]);
        let weather = StubWeather {
            calls: Cell::new(0),
            fail: false,
        };

        let state = load_weather(&geo, &weather).await;

        match state {
            WeatherViewState::Failed(e) => {
                assert_eq!(e.error_code(), "LOCATION_UNAVAILABLE");
                assert_eq!(e.presentation(), crate::error::Presentation::Blocking);
            }
            other => panic!("expected blocking error, got {:?}", other),
        }
        assert_eq!(weather.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_weather_fetch_failure_shows_nothing() {
        let geo = ScriptedGeolocation::new(vec![Ok(BREST)]);
        let weather = StubWeather {
            calls: Cell::new(0),
            fail: true,
        };

        let state = load_weather(&geo, &weather).await;
        assert!(matches!(state, WeatherViewState::Failed(AppError::WeatherFetchFailed(_))));
    }

    #[tokio::test]
    async fn test_weather_ready() {
        let geo = ScriptedGeolocation::new(vec![Ok(BREST)]);
        let weather = StubWeather {
            calls: Cell::new(0),
            fail: false,
        };

        match load_weather(&geo, &weather).await {
            WeatherViewState::Ready { position, snapshot } => {
                assert_eq!(position, BREST);
                assert_eq!(snapshot.rounded_temperature(), 21);
                assert_eq!(snapshot.wind_speed_kmh(), 11);
            }
            other => panic!("expected weather, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_map_falls_back_on_denial() {
        let geo = ScriptedGeolocation::new(vec![Err(LocationError::PermissionDenied)]);
        let view = resolve_map_view(&geo, &MapConfig::default()).await;

        assert_eq!(view.center, FALLBACK_COORDINATE);
        assert_eq!(view.center, Coordinate::new(48.8566, 2.3522));
        assert_eq!(view.source, PositionSource::Fallback);
        assert_eq!(view.zoom, 13);
    }

    #[tokio::test]
    async fn test_recenter_keeps_view_on_failure() {
        let geo = ScriptedGeolocation::new(vec![Ok(BREST), Err(LocationError::Timeout)]);
        let config = MapConfig::default();
        let view = resolve_map_view(&geo, &config).await;
        assert_eq!(view.source, PositionSource::Device);

        let after = recenter(&geo, view).await;
        assert_eq!(after, view);
    }

    #[tokio::test]
    async fn test_recenter_moves_to_device() {
        let geo = ScriptedGeolocation::new(vec![Err(LocationError::Unsupported), Ok(BREST)]);
        let view = resolve_map_view(&geo, &MapConfig::default()).await;

        let after = recenter(&geo, view).await;
        assert_eq!(after.center, BREST);
        assert_eq!(after.source, PositionSource::Device);
        assert_eq!(after.zoom, view.zoom);
    }

    #[test]
    fn test_embed_url_contains_marker() {
        let view = MapViewState {
            center: FALLBACK_COORDINATE,
            source: PositionSource::Fallback,
            zoom: 13,
        };
        let url = view.embed_url();
        assert!(url.starts_with("https://www.openstreetmap.org/export/embed.html?bbox="));
        assert!(url.ends_with("&layer=mapnik&marker=48.85660%2C2.35220"));
    }
}
