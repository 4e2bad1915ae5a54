use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::DrawingSpace;
use crate::foundation::error::ReelResult;
use crate::stroke::model::{Stroke, StrokeDef, StrokeMeta};

const REASONING_MAX_CHARS: usize = 100;

/// Wire shape of one drawing step emitted by the upstream producer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstructionDef {
    #[serde(default, alias = "tool", skip_serializing_if = "Option::is_none")]
    pub brush: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub strokes: Vec<StrokeDef>,
}

/// A drawing step ready for playback: every stroke is already valid (or a fallback).
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    /// 1-based step number shown in overlays.
    pub step_number: u32,
    pub description: String,
    pub tool: Option<String>,
    pub color: Option<String>,
    pub strokes: Vec<Stroke>,
}

impl Instruction {
    /// Validate `def`, substituting fallback strokes for malformed or missing ones.
    pub fn from_def(step_number: u32, def: &InstructionDef, space: DrawingSpace) -> Self {
        let meta_for = |stroke: &Stroke| StrokeMeta {
            tool: def.brush.clone(),
            color: def.color.clone(),
            description: stroke.meta.description.clone(),
        };

        let mut strokes: Vec<Stroke> = def
            .strokes
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let stroke = Stroke::from_def_or_fallback(i, s, space);
                let meta = meta_for(&stroke);
                stroke.with_meta(meta)
            })
            .collect();

        if strokes.is_empty() {
            tracing::warn!(step_number, "instruction has no strokes, using fallback");
            let stroke = Stroke::fallback(0, space);
            let meta = meta_for(&stroke);
            strokes.push(stroke.with_meta(meta));
        }

        let description = def
            .reasoning
            .as_deref()
            .unwrap_or("No reasoning provided")
            .chars()
            .take(REASONING_MAX_CHARS)
            .collect();

        Self {
            step_number,
            description,
            tool: def.brush.clone(),
            color: def.color.clone(),
            strokes,
        }
    }
}

/// A whole replayable session as stored on disk.
///
/// Accepts either `{"instructions": [...]}` or a bare array of instructions.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "SessionScriptRepr")]
pub struct SessionScript {
    pub instructions: Vec<InstructionDef>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SessionScriptRepr {
    Wrapped { instructions: Vec<InstructionDef> },
    Bare(Vec<InstructionDef>),
}

impl From<SessionScriptRepr> for SessionScript {
    fn from(repr: SessionScriptRepr) -> Self {
        match repr {
            SessionScriptRepr::Wrapped { instructions } | SessionScriptRepr::Bare(instructions) => {
                Self { instructions }
            }
        }
    }
}

impl SessionScript {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let script = serde_json::from_str(s).context("parse session script JSON")?;
        Ok(script)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read session script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Validate every instruction, numbering steps from 1.
    pub fn instructions(&self, space: DrawingSpace) -> Vec<Instruction> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, def)| Instruction::from_def(i as u32 + 1, def, space))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/script.rs"]
mod tests;
