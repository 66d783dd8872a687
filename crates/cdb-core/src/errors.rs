/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can handle failures consistently. The completion variants carry fixed,
/// user-presentable messages; upstream response bodies are logged by the
/// adapter and never embedded here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("API anahtarı geçersiz. Lütfen API anahtarınızı kontrol edin.")]
    InvalidCredentials,

    #[error("Rate limit aşıldı. Lütfen daha sonra tekrar deneyin.")]
    RateLimited,

    #[error("CortexAPI sunucu hatası. Lütfen daha sonra tekrar deneyin.")]
    UpstreamUnavailable,

    #[error("API yanıtında beklenmeyen format.")]
    MalformedResponse,

    #[error("AI ile iletişimde hata oluştu.")]
    Unexpected,

    #[error("missing command argument: {0}")]
    MissingArgument(String),

    #[error("messaging error: {0}")]
    Messaging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
