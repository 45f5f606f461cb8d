//! Script Context - Entities

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{CharacterId, LineId, ScriptError, VoiceName, MAX_SPEED, MIN_SPEED};

/// 角色
///
/// 由角色编辑 UI 创建和修改，合成组件只读使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub voice: VoiceName,
    /// 口音 ID，见 [`super::Accent`]
    pub accent: String,
    /// 语速倍率 [0.5, 1.5]
    pub speed: f32,
}

impl Character {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        voice: VoiceName,
        accent: impl Into<String>,
        speed: f32,
    ) -> Self {
        Self {
            id: CharacterId::new(id),
            name: name.into(),
            voice,
            accent: accent.into(),
            speed,
        }
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.name.trim().is_empty() {
            return Err(ScriptError::InvalidName(self.id.clone()));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ScriptError::SpeedOutOfRange {
                id: self.id.clone(),
                speed: self.speed,
            });
        }
        Ok(())
    }
}

/// 台词行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub id: LineId,
    pub character_id: CharacterId,
    pub text: String,
}

impl ScriptLine {
    pub fn new(id: impl Into<String>, character_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: LineId::new(id),
            character_id: CharacterId::new(character_id),
            text: text.into(),
        }
    }
}

/// 剧本中实际出场的角色
///
/// 按首次出场顺序排列；引用了角色表中不存在的 ID 的台词不产生角色。
pub fn active_characters<'a>(lines: &[ScriptLine], roster: &'a [Character]) -> Vec<&'a Character> {
    let mut seen: HashSet<&CharacterId> = HashSet::new();
    let mut active = Vec::new();
    for line in lines {
        if !seen.insert(&line.character_id) {
            continue;
        }
        if let Some(character) = roster.iter().find(|c| c.id == line.character_id) {
            active.push(character);
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Character> {
        vec![
            Character::new("1", "Narrador", VoiceName::Kore, "neutral", 1.0),
            Character::new("2", "Entrevistador", VoiceName::Puck, "mexican", 1.1),
            Character::new("3", "Invitada", VoiceName::Zephyr, "chilean", 0.9),
        ]
    }

    #[test]
    fn test_active_characters_first_appearance_order() {
        let roster = roster();
        let lines = vec![
            ScriptLine::new("a", "3", "Hola"),
            ScriptLine::new("b", "1", "Bienvenidos"),
            ScriptLine::new("c", "3", "Gracias"),
        ];

        let active = active_characters(&lines, &roster);
        let ids: Vec<&str> = active.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_active_characters_ignores_unknown_ids() {
        let roster = roster();
        let lines = vec![
            ScriptLine::new("a", "99", "¿Quién soy?"),
            ScriptLine::new("b", "2", "Nadie"),
        ];

        let active = active_characters(&lines, &roster);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Entrevistador");
        assert!(active_characters(&[], &roster).is_empty());
    }

    #[test]
    fn test_validate() {
        let mut character = roster().remove(0);
        assert!(character.validate().is_ok());

        character.speed = 1.6;
        assert!(matches!(
            character.validate(),
            Err(ScriptError::SpeedOutOfRange { .. })
        ));

        character.speed = 1.0;
        character.name = "  ".to_string();
        assert!(matches!(character.validate(), Err(ScriptError::InvalidName(_))));
    }

    #[test]
    fn test_line_deserialize() {
        let line: ScriptLine =
            serde_json::from_str(r#"{"id":"1","character_id":"2","text":"Hola"}"#).unwrap();
        assert_eq!(line.character_id, CharacterId::new("2"));
    }
}
