use crate::core::controller::{DragSettings, DEFAULT_CONFIRMATION_TIMEOUT};
use crate::utils::error::{BoardError, Result};
use crate::utils::validation::{
    validate_known_id, validate_non_empty_string, validate_non_negative, validate_positive,
    validate_range, validate_required_field, validate_unique_ids, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// 確認逾時的上限 (一小時)
const MAX_CONFIRMATION_TIMEOUT_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub drag: DragConfig,
    pub refresh: Option<RefreshConfig>,
    pub viewport: ViewportConfig,
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DragConfig {
    /// 0 表示不設期限
    pub confirmation_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default)]
    pub left: f64,
    pub width: f64,
    pub content_width: f64,
    #[serde(default)]
    pub scroll_offset: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub droppable: bool,
    /// 是否註冊接受回呼；沒有回呼的欄位不能放置
    #[serde(default = "default_true")]
    pub accepts_drops: bool,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default = "default_card_width")]
    pub width: f64,
    #[serde(default)]
    pub issue: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    Start {
        card: String,
        #[serde(default)]
        left: f64,
    },
    Move {
        helper_left: f64,
    },
    DropOn {
        column: String,
    },
    Release {
        #[serde(default)]
        confirm: ConfirmDecision,
    },
    SetDroppable {
        column: String,
        droppable: bool,
    },
}

/// 模擬確認對話框的回答
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmDecision {
    #[default]
    Accept,
    Reject,
    /// 對話框一直不回答
    Never,
}

fn default_true() -> bool {
    true
}

fn default_card_width() -> f64 {
    240.0
}

impl ScenarioConfig {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BoardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${BOARD_NAME})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BoardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        match self.drag.confirmation_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(DEFAULT_CONFIRMATION_TIMEOUT),
        }
    }

    pub fn drag_settings(&self) -> DragSettings {
        DragSettings {
            confirmation_timeout: self.confirmation_timeout(),
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh
            .as_ref()
            .filter(|r| r.enabled)
            .map(|r| Duration::from_millis(r.interval_ms.unwrap_or(1000)))
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

impl Validate for ScenarioConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("board.name", &self.board.name)?;

        validate_positive("viewport.width", self.viewport.width)?;
        validate_non_negative("viewport.content_width", self.viewport.content_width)?;
        validate_non_negative("viewport.scroll_offset", self.viewport.scroll_offset)?;
        if !self.viewport.left.is_finite() {
            return Err(BoardError::InvalidConfigValueError {
                field: "viewport.left".to_string(),
                value: self.viewport.left.to_string(),
                reason: "Value must be finite".to_string(),
            });
        }

        if let Some(ms) = self.drag.confirmation_timeout_ms {
            validate_range("drag.confirmation_timeout_ms", ms, 0, MAX_CONFIRMATION_TIMEOUT_MS)?;
        }
        if let Some(refresh) = self.refresh.as_ref().filter(|r| r.enabled) {
            let ms = validate_required_field("refresh.interval_ms", &refresh.interval_ms)?;
            validate_range("refresh.interval_ms", *ms, 10, 600_000)?;
        }

        if self.columns.is_empty() {
            return Err(BoardError::MissingConfigError {
                field: "columns".to_string(),
            });
        }
        validate_unique_ids("columns.id", self.columns.iter().map(|c| c.id.as_str()))?;
        validate_unique_ids(
            "columns.cards.id",
            self.columns
                .iter()
                .flat_map(|c| c.cards.iter().map(|card| card.id.as_str())),
        )?;
        for card in self.columns.iter().flat_map(|c| c.cards.iter()) {
            validate_positive("columns.cards.width", card.width)?;
        }

        let columns: HashSet<&str> = self.columns.iter().map(|c| c.id.as_str()).collect();
        let cards: HashSet<&str> = self
            .columns
            .iter()
            .flat_map(|c| c.cards.iter().map(|card| card.id.as_str()))
            .collect();

        for step in &self.steps {
            match step {
                ScenarioStep::Start { card, left } => {
                    validate_known_id("steps.card", card, &cards)?;
                    if !left.is_finite() {
                        return Err(BoardError::InvalidConfigValueError {
                            field: "steps.left".to_string(),
                            value: left.to_string(),
                            reason: "Value must be finite".to_string(),
                        });
                    }
                }
                ScenarioStep::Move { helper_left } if !helper_left.is_finite() => {
                    return Err(BoardError::InvalidConfigValueError {
                        field: "steps.helper_left".to_string(),
                        value: helper_left.to_string(),
                        reason: "Value must be finite".to_string(),
                    });
                }
                ScenarioStep::DropOn { column } | ScenarioStep::SetDroppable { column, .. } => {
                    validate_known_id("steps.column", column, &columns)?;
                }
                ScenarioStep::Release {
                    confirm: ConfirmDecision::Never,
                } if self.confirmation_timeout().is_none() => {
                    return Err(BoardError::InvalidConfigValueError {
                        field: "steps.confirm".to_string(),
                        value: "never".to_string(),
                        reason: "An unanswered confirmation needs drag.confirmation_timeout_ms > 0"
                            .to_string(),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
