use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
    Info,
    Warning,
    /// `message` holds the path the operator should be sent to
    Redirect,
}

/// Terminal outcome of an action, shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub message: String,
}

impl Message {
    pub fn new(kind: MessageKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(MessageKind::Warning, message)
    }

    pub fn redirect(path: impl Into<String>) -> Self {
        Self::new(MessageKind::Redirect, path)
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// 將訊息輸出到終端機並記錄日誌
pub fn dispatch(message: &Message) {
    match message.kind {
        MessageKind::Success => {
            tracing::info!("✅ {}", message.message);
            println!("✅ {}", message.message);
        }
        MessageKind::Info => {
            tracing::info!("ℹ️ {}", message.message);
            println!("ℹ️  {}", message.message);
        }
        MessageKind::Warning => {
            tracing::warn!("⚠️ {}", message.message);
            eprintln!("⚠️  {}", message.message);
        }
        MessageKind::Error => {
            tracing::error!("❌ {}", message.message);
            eprintln!("❌ {}", message.message);
        }
        MessageKind::Redirect => {
            tracing::info!("➡️ Next: {}", message.message);
            println!("➡️  {}", message.message);
        }
    }
}
