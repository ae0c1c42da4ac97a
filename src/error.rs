use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `classpulse`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary edge continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum PulseError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Feedback model / validation ─────────────────────────────────────
    #[error("feedback: {0}")]
    Feedback(#[from] FeedbackError),

    // ── Durable store ───────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Delivery / gateway ──────────────────────────────────────────────
    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Feedback validation errors ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback text exceeds {max} characters (got {len})")]
    TextTooLong { len: usize, max: usize },

    #[error("unknown feedback kind: {0}")]
    UnknownKind(String),
}

// ─── Store errors ───────────────────────────────────────────────────────────

/// A persistence fault is fatal for the operation that hit it: the caller
/// must not assume the item was saved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open history database: {0}")]
    Open(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("corrupt history row {id}: {message}")]
    CorruptRow { id: String, message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

// ─── Delivery errors ────────────────────────────────────────────────────────

/// Outcome classification for a single submission attempt.
///
/// The scheduler retries every failure uniformly on the next cycle, but the
/// transient/permanent split is recorded so a retry ceiling could be added
/// without re-plumbing the gateway.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("endpoint rejected feedback (HTTP {status})")]
    Rejected { status: u16 },

    #[error("collector unavailable (HTTP {status})")]
    Upstream { status: u16 },

    #[error("network: {0}")]
    Network(String),

    #[error("unparseable collector response: {0}")]
    BadResponse(String),
}

impl DeliveryError {
    /// Whether the failure class is expected to clear on its own.
    pub fn is_transient(&self) -> bool {
        !matches!(self, DeliveryError::Rejected { .. })
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PulseError>;
