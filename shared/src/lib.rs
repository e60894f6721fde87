use serde::{Deserialize, Serialize};
use std::fmt;

pub mod date;
pub mod serde_helper;

use serde_helper::lenient_string;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const COLLECTION_USERS: &str = "users";
pub const COLLECTION_BOATS: &str = "boats";

/// 定位失败时地图使用的默认中心点（巴黎）
pub const FALLBACK_COORDINATE: Coordinate = Coordinate {
    latitude: 48.8566,
    longitude: 2.3522,
};

// =========================================================
// 身份与会话 (Identity & Session)
// =========================================================

/// 已认证用户的不透明唯一标识
///
/// 同时作为文档存储中个人记录的 key。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 当前进程内唯一的已认证会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    pub email: String,
}

impl Session {
    pub fn new(identity: Identity, email: impl Into<String>) -> Self {
        Self {
            identity,
            email: email.into(),
        }
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 按用户存储的记录类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    PersonalInfo,
    Boat,
}

impl ResourceKind {
    /// 文档存储中的集合名
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::PersonalInfo => COLLECTION_USERS,
            ResourceKind::Boat => COLLECTION_BOATS,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ResourceKind::PersonalInfo => "personal-info",
            ResourceKind::Boat => "boat",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// 个人信息，存储于 `users/{identity}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
}

/// 船型，序列化为界面上的法语标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoatType {
    Sailboat,
    Catamaran,
    MotorYacht,
    Rib,
    FishingBoat,
    Other,
}

impl BoatType {
    pub const ALL: [BoatType; 6] = [
        BoatType::Sailboat,
        BoatType::Catamaran,
        BoatType::MotorYacht,
        BoatType::Rib,
        BoatType::FishingBoat,
        BoatType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BoatType::Sailboat => "Voilier",
            BoatType::Catamaran => "Catamaran",
            BoatType::MotorYacht => "Yacht à moteur",
            BoatType::Rib => "Semi-rigide",
            BoatType::FishingBoat => "Bateau de pêche",
            BoatType::Other => "Autre",
        }
    }

    /// 从标签解析，未知或空白标签返回 None
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for BoatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 船只档案，存储于 `boats/{identity}`
///
/// 数值字段保存用户输入的原始文本，校验在提交前进行。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoatProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", with = "serde_helper::boat_type_label")]
    pub boat_type: Option<BoatType>,
    #[serde(deserialize_with = "lenient_string")]
    pub length: String,
    #[serde(deserialize_with = "lenient_string")]
    pub width: String,
    #[serde(deserialize_with = "lenient_string")]
    pub draft: String,
    #[serde(deserialize_with = "lenient_string")]
    pub manufacturer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub registration_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub home_port: String,
}

// =========================================================
// 地理位置与天气 (Geo & Weather)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// 单次天气查询结果，不缓存也不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// 摄氏度
    pub temperature: f64,
    pub description: String,
    /// 百分比
    pub humidity: f64,
    /// 米/秒
    pub wind_speed: f64,
    /// 百帕
    pub pressure: f64,
}

impl WeatherSnapshot {
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }

    pub fn wind_speed_kmh(&self) -> i64 {
        (self.wind_speed * 3.6).round() as i64
    }
}
