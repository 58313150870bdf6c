//! Design extraction from LLM tool calls
//!
//! The design assistant finishes a conversation by calling the
//! `generate_pcb_project` function. Its arguments arrive as JSON text, often
//! streamed in fragments across chat-completion chunks. This module collects
//! those fragments and turns the final payload into a [`GeneratedProject`],
//! from which a [`DesignSnapshot`] can be taken for validation.

use serde::{Deserialize, Serialize};

use crate::core::BoardCheckError;
use crate::design::{string_or_number, Component, Connection, DesignSnapshot, PowerSpecs};

/// Name of the function the assistant calls to emit a design.
pub const GENERATE_PROJECT_TOOL: &str = "generate_pcb_project";

pub const DEFAULT_BOARD_WIDTH_MM: f64 = 50.0;
pub const DEFAULT_BOARD_HEIGHT_MM: f64 = 30.0;
pub const DEFAULT_BOARD_LAYERS: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Meshtastic,
    IotSensor,
    PowerSupply,
    Robotics,
    #[default]
    #[serde(other)]
    Custom,
}

/// Power section of the tool call. Figures may be numbers or strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PowerAnalysis {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub current_active: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub current_sleep: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_life_estimate: Option<String>,
}

impl PowerAnalysis {
    pub fn power_specs(&self) -> PowerSpecs {
        PowerSpecs {
            voltage: self.voltage.clone(),
            current_active: self.current_active.clone(),
            current_sleep: self.current_sleep.clone(),
        }
    }
}

/// Board outline as requested by the assistant; every field is optional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BoardSpecs {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub layers: Option<u32>,
}

/// Board outline with defaults applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub width_mm: f64,
    pub height_mm: f64,
    pub layers: u32,
}

/// Zero, negative and non-finite dimensions fall back to the defaults.
impl From<Option<BoardSpecs>> for Board {
    fn from(specs: Option<BoardSpecs>) -> Self {
        let specs = specs.unwrap_or_default();
        let positive = |v: &f64| v.is_finite() && *v > 0.0;
        Board {
            width_mm: specs.width.filter(positive).unwrap_or(DEFAULT_BOARD_WIDTH_MM),
            height_mm: specs.height.filter(positive).unwrap_or(DEFAULT_BOARD_HEIGHT_MM),
            layers: specs
                .layers
                .filter(|&l| l > 0)
                .unwrap_or(DEFAULT_BOARD_LAYERS),
        }
    }
}

/// Arguments of a `generate_pcb_project` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedProject {
    pub project_name: String,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub power_analysis: Option<PowerAnalysis>,
    #[serde(default)]
    pub board_specs: Option<BoardSpecs>,
}

impl GeneratedProject {
    pub fn from_arguments(arguments: &str) -> Result<Self, BoardCheckError> {
        serde_json::from_str(arguments)
            .map_err(|e| BoardCheckError::Extract(format!("invalid tool call arguments: {}", e)))
    }

    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot {
            name: Some(self.project_name.clone()),
            components: self.components.clone(),
            connections: self.connections.clone(),
            power_specs: self.power_analysis.as_ref().map(PowerAnalysis::power_specs),
        }
    }

    pub fn board(&self) -> Board {
        Board::from(self.board_specs)
    }
}

/// Collects a streamed tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolCallAccumulator {
    name: Option<String>,
    arguments: String,
    finished: bool,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn push_arguments(&mut self, fragment: &str) {
        self.arguments.push_str(fragment);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds one chat-completion chunk (`{"choices": [{"delta": ...}]}`).
    /// Picks up the tool name and argument fragment of the first tool call,
    /// and returns `true` once the chunk reports `finish_reason: "tool_calls"`.
    pub fn feed_chunk(&mut self, chunk: &serde_json::Value) -> bool {
        let Some(choice) = chunk.get("choices").and_then(|c| c.get(0)) else {
            return false;
        };

        if let Some(function) = choice
            .get("delta")
            .and_then(|d| d.get("tool_calls"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("function"))
        {
            if let Some(name) = function.get("name").and_then(|n| n.as_str()) {
                tracing::debug!("Tool call started: {}", name);
                self.set_name(name);
            }
            if let Some(fragment) = function.get("arguments").and_then(|a| a.as_str()) {
                self.push_arguments(fragment);
            }
        }

        if choice.get("finish_reason").and_then(|r| r.as_str()) == Some("tool_calls") {
            self.finished = true;
        }
        self.finished
    }

    /// Feeds one server-sent-events line (`data: {...}`). Blank lines,
    /// comments, `[DONE]` and unparsable payloads are ignored.
    pub fn feed_sse_line(&mut self, line: &str) -> bool {
        let Some(payload) = line.trim_end().strip_prefix("data: ") else {
            return self.finished;
        };
        if payload == "[DONE]" {
            return self.finished;
        }
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(chunk) => self.feed_chunk(&chunk),
            Err(e) => {
                tracing::debug!("Skipping partial stream chunk: {}", e);
                self.finished
            }
        }
    }

    /// Parses the collected arguments. Fails if a different tool was called
    /// or nothing was collected.
    pub fn finish(self) -> Result<GeneratedProject, BoardCheckError> {
        if let Some(name) = &self.name {
            if name != GENERATE_PROJECT_TOOL {
                return Err(BoardCheckError::Extract(format!("unexpected tool call: {}", name)));
            }
        }
        if self.arguments.trim().is_empty() {
            return Err(BoardCheckError::Extract(
                "no tool call arguments received".to_string(),
            ));
        }
        GeneratedProject::from_arguments(&self.arguments)
    }
}

/// Reads a design document. Accepts a plain snapshot
/// (`{"components": [...], "connections": [...]}`), the arguments object of a
/// `generate_pcb_project` call, or a complete tool call object
/// (`{"function": {"name": ..., "arguments": "..."}}`).
pub fn parse_design_document(json: &str) -> Result<(DesignSnapshot, Option<Board>), BoardCheckError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    if let Some(function) = value.get("function") {
        let mut call = ToolCallAccumulator::new();
        if let Some(name) = function.get("name").and_then(|n| n.as_str()) {
            call.set_name(name);
        }
        match function.get("arguments") {
            Some(serde_json::Value::String(args)) => call.push_arguments(args),
            Some(args) if args.is_object() => call.push_arguments(&args.to_string()),
            _ => {}
        }
        let project = call.finish()?;
        return Ok((project.snapshot(), Some(project.board())));
    }

    if value.get("project_name").is_some() {
        let project: GeneratedProject = serde_json::from_value(value)
            .map_err(|e| BoardCheckError::Extract(format!("invalid project: {}", e)))?;
        return Ok((project.snapshot(), Some(project.board())));
    }

    let snapshot: DesignSnapshot = serde_json::from_value(value)?;
    Ok((snapshot, None))
}
