use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unknown card: {card}")]
    UnknownCard { card: String },

    #[error("Unknown container: {container}")]
    UnknownContainer { container: String },

    #[error("Card {card} is not registered as draggable")]
    NotDraggable { card: String },

    #[error("A drag of card {card} is already in progress")]
    DragInProgress { card: String },

    #[error("No drag session is active")]
    NoActiveDrag,

    #[error("Board state is unavailable (lock poisoned)")]
    BoardUnavailable,
}

impl BoardError {
    /// 是否為配置相關錯誤
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BoardError::TomlError(_)
                | BoardError::ConfigError { .. }
                | BoardError::InvalidConfigValueError { .. }
                | BoardError::MissingConfigError { .. }
                | BoardError::ValidationError { .. }
        )
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BoardError::IoError(e) => format!("Could not read or write a file: {}", e),
            BoardError::TomlError(_) => "The board file is not valid TOML".to_string(),
            BoardError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            BoardError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            BoardError::UnknownCard { card } => format!("Card '{}' is not on the board", card),
            BoardError::UnknownContainer { container } => {
                format!("Column '{}' is not on the board", container)
            }
            BoardError::DragInProgress { .. } => {
                "Another card is still being dragged".to_string()
            }
            other => other.to_string(),
        }
    }

    /// 建議的修復方式
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BoardError::IoError(_) => "Check that the file exists and is readable",
            BoardError::TomlError(_) | BoardError::ConfigError { .. } => {
                "Fix the syntax of the board file and try again"
            }
            BoardError::InvalidConfigValueError { .. }
            | BoardError::MissingConfigError { .. }
            | BoardError::ValidationError { .. } => "Correct the reported setting in the board file",
            BoardError::UnknownCard { .. } | BoardError::UnknownContainer { .. } => {
                "Make sure every step refers to a card or column defined on the board"
            }
            BoardError::NotDraggable { .. } => "Mark the card as draggable before dragging it",
            BoardError::DragInProgress { .. } | BoardError::NoActiveDrag => {
                "Release the current drag before starting another one"
            }
            BoardError::BoardUnavailable => "Reload the board",
            BoardError::SerializationError(_) => "Check the issue payloads for unsupported values",
        }
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        let err = BoardError::MissingConfigError {
            field: "viewport".to_string(),
        };
        assert!(err.is_config_error());
        assert!(err.user_friendly_message().contains("viewport"));

        assert!(!BoardError::NoActiveDrag.is_config_error());
    }
}
