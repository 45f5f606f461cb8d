//! Script Context - Value Objects

use serde::{Deserialize, Serialize};

/// 语速下限
pub const MIN_SPEED: f32 = 0.5;
/// 语速上限
pub const MAX_SPEED: f32 = 1.5;

/// 角色唯一标识（由编辑器 UI 分配）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 台词行唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

/// 合成服务预置音色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceName {
    Kore,
    Puck,
    Charon,
    Fenrir,
    Zephyr,
}

impl VoiceName {
    pub const ALL: [VoiceName; 5] = [
        VoiceName::Kore,
        VoiceName::Puck,
        VoiceName::Charon,
        VoiceName::Fenrir,
        VoiceName::Zephyr,
    ];

    /// 线上协议使用的音色名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kore => "Kore",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(name))
    }

    /// 编辑器中展示的标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kore => "Kore (Femenina, Calma)",
            Self::Puck => "Puck (Masculino, Energético)",
            Self::Charon => "Charon (Masculino, Profundo)",
            Self::Fenrir => "Fenrir (Masculino, Intenso)",
            Self::Zephyr => "Zephyr (Femenina, Suave)",
        }
    }

    pub fn gender(&self) -> Gender {
        match self {
            Self::Kore | Self::Zephyr => Gender::Female,
            Self::Puck | Self::Charon | Self::Fenrir => Gender::Male,
        }
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已知口音
///
/// 角色上保存的是口音 ID 字符串，未知 ID 在生成表演指导时回退为中性描述。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Neutral,
    Mexican,
    Argentine,
    Spanish,
    Colombian,
    Chilean,
}

impl Accent {
    pub const ALL: [Accent; 6] = [
        Accent::Neutral,
        Accent::Mexican,
        Accent::Argentine,
        Accent::Spanish,
        Accent::Colombian,
        Accent::Chilean,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Mexican => "mexican",
            Self::Argentine => "argentine",
            Self::Spanish => "spanish",
            Self::Colombian => "colombian",
            Self::Chilean => "chilean",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Neutral => "Español Neutro",
            Self::Mexican => "Mexicano",
            Self::Argentine => "Argentino",
            Self::Spanish => "Español (España)",
            Self::Colombian => "Colombiano",
            Self::Chilean => "Chileno",
        }
    }
}
