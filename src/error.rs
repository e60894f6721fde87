use thiserror::Error;

// =========================================================
// 错误呈现方式
// =========================================================

/// 错误在界面上的呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// 可关闭的临时提示（认证、保存失败）
    Notification,
    /// 整个视图的阻塞错误状态（定位、天气失败）
    Blocking,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端错误分类
///
/// 所有错误都在触发它的视图内部恢复，永远不会终止应用。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("an account already exists for this email")]
    AccountAlreadyExists,

    #[error("invalid credentials format: {0}")]
    InvalidCredentialsFormat(String),

    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("validation failed on `{field}`: {reason}")]
    ValidationFailed { field: &'static str, reason: String },

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("weather fetch failed: {0}")]
    WeatherFetchFailed(String),

    /// 视图仍在加载或保存中
    #[error("not ready: {0}")]
    NotReady(&'static str),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    /// 机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AuthenticationFailed => "AUTH_FAILED",
            AppError::AccountAlreadyExists => "ACCOUNT_EXISTS",
            AppError::InvalidCredentialsFormat(_) => "INVALID_CREDENTIALS_FORMAT",
            AppError::PersistenceFailed(_) => "PERSISTENCE_FAILED",
            AppError::ValidationFailed { .. } => "VALIDATION_FAILED",
            AppError::LocationUnavailable(_) => "LOCATION_UNAVAILABLE",
            AppError::WeatherFetchFailed(_) => "WEATHER_FETCH_FAILED",
            AppError::NotReady(_) => "NOT_READY",
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            AppError::LocationUnavailable(_) | AppError::WeatherFetchFailed(_) => {
                Presentation::Blocking
            }
            _ => Presentation::Notification,
        }
    }

    /// 展示给用户的文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::AuthenticationFailed => {
                "Échec de la connexion. Vérifiez vos identifiants.".to_string()
            }
            AppError::AccountAlreadyExists => {
                "Un compte existe déjà avec cette adresse email".to_string()
            }
            AppError::InvalidCredentialsFormat(_) => {
                "Adresse email ou mot de passe invalide (6 caractères minimum)".to_string()
            }
            AppError::PersistenceFailed(_) => "Erreur lors de la sauvegarde".to_string(),
            AppError::ValidationFailed { reason, .. } => reason.clone(),
            AppError::LocationUnavailable(_) => "Impossible d'obtenir votre position".to_string(),
            AppError::WeatherFetchFailed(_) => {
                "Impossible de récupérer les données météo".to_string()
            }
            AppError::NotReady(_) => "Chargement en cours, veuillez patienter".to_string(),
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
