//! 表演指导生成
//!
//! 把角色的口音 / 语速转换为自然语言的表演指导，
//! 并把任意数量的出场角色映射到合成协议仅有的两个说话人槽位。

use std::fmt::Write as _;

use crate::domain::script::{Accent, Character, CharacterId, ScriptLine, VoiceName};

/// 未知口音 ID 的回退描述
pub const FALLBACK_ACCENT_DIRECTION: &str = "Neutral Spanish accent";

/// 语速 → 表演指导
///
/// 边界: ≤0.7 很慢；(0.7, 1.0) 慢；==1.0 正常；(1.0, 1.3] 快；>1.3 很快
pub fn speed_direction(speed: f32) -> &'static str {
    if speed <= 0.7 {
        "speaking very slowly and deliberately"
    } else if speed < 1.0 {
        "speaking slowly"
    } else if speed == 1.0 {
        "speaking at a normal natural pace"
    } else if speed <= 1.3 {
        "speaking quickly and enthusiastically"
    } else {
        "speaking very fast"
    }
}

/// 口音 ID → 表演指导，未知 ID 回退为中性描述
pub fn accent_direction(accent_id: &str) -> &'static str {
    match Accent::from_id(accent_id) {
        Some(Accent::Mexican) => "Mexican Spanish accent",
        Some(Accent::Argentine) => "Rioplatense Argentine Spanish accent",
        Some(Accent::Spanish) => "Castilian Spanish accent (Spain)",
        Some(Accent::Colombian) => "Colombian Spanish accent",
        Some(Accent::Chilean) => "Chilean Spanish accent",
        Some(Accent::Neutral) => "Neutral Latin American Spanish accent",
        None => FALLBACK_ACCENT_DIRECTION,
    }
}

/// 角色的完整表演指导：`<口音>, <语速>`
pub fn acting_direction(character: &Character) -> String {
    format!(
        "{}, {}",
        accent_direction(&character.accent),
        speed_direction(character.speed)
    )
}

/// 多说话人合成协议的槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// 按出场位置交替分配
    pub fn for_position(index: usize) -> Self {
        if index % 2 == 0 {
            Self::A
        } else {
            Self::B
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "Speaker A",
            Self::B => "Speaker B",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 一次合成请求的槽位分配（临时，不持久化）
///
/// 不变量:
/// - 每个出场角色恰好对应一个槽位
/// - 每个槽位只有一个音色和一份表演指导，来自该槽位的主导角色
#[derive(Debug, Clone)]
pub struct SlotAssignment<'a> {
    slots: Vec<(&'a CharacterId, Slot)>,
    lead_a: &'a Character,
    lead_b: &'a Character,
}

impl<'a> SlotAssignment<'a> {
    pub fn slot_of(&self, id: &CharacterId) -> Option<Slot> {
        self.slots
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, slot)| *slot)
    }

    /// 决定槽位音色与表演指导的角色
    pub fn lead(&self, slot: Slot) -> &'a Character {
        match slot {
            Slot::A => self.lead_a,
            Slot::B => self.lead_b,
        }
    }

    pub fn voice(&self, slot: Slot) -> VoiceName {
        self.lead(slot).voice
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// 把出场角色（按首次出场排序）映射到 A/B 两个槽位
///
/// - 第 i 个角色：i 为偶数 → A，奇数 → B
/// - A 的音色取第一个角色
/// - B 的音色取第一个与 A 音色不同的角色；全部相同时取第二个角色，
///   只有一个角色时取第一个
///
/// 第三个及之后的角色共用所在槽位的音色和表演指导。
pub fn assign_slots<'a>(active: &[&'a Character]) -> Option<SlotAssignment<'a>> {
    let lead_a = *active.first()?;
    let lead_b = active
        .iter()
        .copied()
        .find(|c| c.voice != lead_a.voice)
        .or_else(|| active.get(1).copied())
        .unwrap_or(lead_a);

    let slots = active
        .iter()
        .enumerate()
        .map(|(index, &character)| (&character.id, Slot::for_position(index)))
        .collect();

    Some(SlotAssignment {
        slots,
        lead_a,
        lead_b,
    })
}

/// 单角色朗读提示词
pub fn single_voice_prompt(character: &Character, lines: &[ScriptLine]) -> String {
    let text = lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Voice Direction: You are a voice actor.\n\
         Character Profile: {}.\n\
         Style: {}.\n\
         \n\
         Please read the following text acting out the character:\n\
         \n\
         {}",
        character.name,
        acting_direction(character),
        text
    )
}

/// 双槽位对话提示词
///
/// 台词按原顺序渲染为 `<槽位>: <文本>`，角色表中找不到的角色落在 A 槽位。
pub fn multi_voice_prompt(assignment: &SlotAssignment<'_>, lines: &[ScriptLine]) -> String {
    let mut prompt = String::from("Context: A podcast conversation.\n\n");
    for slot in [Slot::A, Slot::B] {
        let _ = writeln!(
            prompt,
            "{} Acting Direction: {}.",
            slot,
            acting_direction(assignment.lead(slot))
        );
    }

    prompt.push_str("\nScript:\n");
    let script = lines
        .iter()
        .map(|line| {
            let slot = assignment.slot_of(&line.character_id).unwrap_or(Slot::A);
            format!("{}: {}", slot, line.text)
        })
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str(&script);
    prompt
}
