use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::request::{HttpClient, HttpRequest};
use seatrack_shared::{Coordinate, WeatherSnapshot};
use serde::Deserialize;

// =========================================================
// 响应结构 (只取需要的字段)
// =========================================================

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

// =========================================================
// OpenWeatherMap 客户端
// =========================================================

// https://openweathermap.org/current
//
// Request example
// curl "https://api.openweathermap.org/data/2.5/weather?lat=48.8566&lon=2.3522&units=metric&lang=fr&appid=KEY"
//
// Response (abridged)
// { "weather": [{ "description": "ciel dégagé" }],
//   "main": { "temp": 17.6, "pressure": 1016, "humidity": 72 },
//   "wind": { "speed": 5.0 } }
pub struct OpenWeatherClient<C: HttpClient> {
    client: C,
    config: WeatherConfig,
}

impl<C: HttpClient> OpenWeatherClient<C> {
    // 这里接受任何实现了 HttpClient 的客户端
    pub fn new(client: C, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    pub fn url_for(&self, position: Coordinate) -> String {
        format!(
            "{}?lat={}&lon={}&units={}&lang={}&appid={}",
            self.config.base_url,
            position.latitude,
            position.longitude,
            self.config.units,
            self.config.language,
            self.config.api_key
        )
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> WeatherProvider for OpenWeatherClient<C> {
    async fn fetch(&self, position: Coordinate) -> AppResult<WeatherSnapshot> {
        let req = HttpRequest::get(&self.url_for(position)).with_header("Accept", "application/json");

        let resp = self
            .client
            .send(req)
            .await
            .map_err(|e| AppError::WeatherFetchFailed(e.to_string()))?;

        if !resp.ok() {
            return Err(AppError::WeatherFetchFailed(format!(
                "weather provider answered with status {}",
                resp.status
            )));
        }

        let current: CurrentWeather = resp
            .json()
            .map_err(|e| AppError::WeatherFetchFailed(e.to_string()))?;

        let description = current
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| AppError::WeatherFetchFailed("missing weather condition".into()))?;

        Ok(WeatherSnapshot {
            temperature: current.main.temp,
            description,
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            pressure: current.main.pressure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use serde_json::json;

    fn client() -> OpenWeatherClient<MockHttpClient> {
        let config = WeatherConfig {
            api_key: "KEY".into(),
            ..WeatherConfig::default()
        };
        OpenWeatherClient::new(MockHttpClient::new(), config)
    }

    const PARIS: Coordinate = Coordinate::new(48.8566, 2.3522);
    const PARIS_URL: &str = "https://api.openweathermap.org/data/2.5/weather?lat=48.8566&lon=2.3522&units=metric&lang=fr&appid=KEY";

    #[test]
    fn test_url_layout() {
        assert_eq!(client().url_for(PARIS), PARIS_URL);
    }

    #[tokio::test]
    async fn test_fetch_parses_snapshot() {
        let weather = client();
        weather.client.mock_response(
            HttpMethod::Get,
            PARIS_URL,
            200,
            json!({
                "weather": [{ "main": "Clear", "description": "ciel dégagé" }],
                "main": { "temp": 17.6, "pressure": 1016, "humidity": 72 },
                "wind": { "speed": 5.0, "deg": 250 },
                "name": "Paris"
            }),
        );

        let snapshot = weather.fetch(PARIS).await.unwrap();

        assert_eq!(snapshot.description, "ciel dégagé");
        assert_eq!(snapshot.rounded_temperature(), 18);
        assert_eq!(snapshot.humidity, 72.0);
        assert_eq!(snapshot.pressure, 1016.0);
        assert_eq!(snapshot.wind_speed_kmh(), 18);
        assert_eq!(weather.client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let weather = client();
        weather
            .client
            .mock_response(HttpMethod::Get, PARIS_URL, 401, json!({ "cod": 401 }));

        let err = weather.fetch(PARIS).await.unwrap_err();
        assert_eq!(err.error_code(), "WEATHER_FETCH_FAILED");
    }

    #[tokio::test]
    async fn test_missing_condition_fails() {
        let weather = client();
        weather.client.mock_response(
            HttpMethod::Get,
            PARIS_URL,
            200,
            json!({
                "weather": [],
                "main": { "temp": 17.6, "pressure": 1016, "humidity": 72 },
                "wind": { "speed": 5.0 }
            }),
        );

        assert!(matches!(
            weather.fetch(PARIS).await,
            Err(AppError::WeatherFetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let weather = client();
        weather.client.mock_unreachable(PARIS_URL);

        assert!(matches!(
            weather.fetch(PARIS).await,
            Err(AppError::WeatherFetchFailed(_))
        ));
    }
}
