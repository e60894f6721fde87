//! SeaTrack 核心库
//!
//! 与平台无关的业务逻辑：会话、访问守卫、资源同步、外部数据获取，
//! 以及托管后端的 REST 适配器。浏览器相关的实现在 `seatrack-frontend` 中。

pub mod config;
pub mod error;
pub mod external;
pub mod guard;
pub mod lifetime;
pub mod remote;
pub mod request;
pub mod route;
pub mod session;
pub mod sync;

pub use error::{AppError, AppResult, Presentation};
pub use guard::{AccessGuard, GuardDecision, decide};
pub use lifetime::ViewLifetime;
pub use route::AppRoute;
pub use session::{Credentials, SessionManager, SessionState, SignUpRequest, Subscription};
pub use sync::{Notice, NoticeKind, Resource, ResourceSync, SyncPhase};
