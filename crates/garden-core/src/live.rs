use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages pushed by the garden notification server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    GardenUpdate {
        #[serde(default)]
        file: String,
    },
    ToolUsage {
        data: ToolUsage,
    },
    ToolHistory {
        #[serde(default)]
        data: Vec<ToolUsage>,
    },
    Pong,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Ping,
}

/// A single action reported by an external agent working on the garden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolUsage {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ToolUsage {
    pub fn new(tool: &str, args: Value) -> Self {
        Self {
            tool: tool.to_string(),
            args,
            timestamp: None,
        }
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn display_name(&self) -> &str {
        match self.tool.as_str() {
            "add_note" => "Add Note",
            "search_notes" => "Search Notes",
            "expand_knowledge" => "Expand Knowledge",
            "extract_insights" => "Extract Insights",
            "create_exploration_path" => "Create Path",
            "exploration_start" => "Start Exploration",
            "create_seed_note" => "Create Seed Note",
            other => other,
        }
    }

    /// Title of the note this action created, for tools that create one.
    pub fn created_title(&self) -> Option<&str> {
        match self.tool.as_str() {
            "add_note" | "create_seed_note" => self.arg("title"),
            _ => None,
        }
    }

    /// Activity-log line for this action.
    pub fn describe(&self) -> String {
        let a = |k: &str| self.arg(k).unwrap_or("?");
        let mut out = format!("Tool used: {}", self.display_name());
        match self.tool.as_str() {
            "add_note" => out.push_str(&format!(" - Added note \"{}\"", a("title"))),
            "search_notes" => out.push_str(&format!(" - Searched for \"{}\"", a("query"))),
            "expand_knowledge" => out.push_str(&format!(
                " - Expanded \"{}\" ({})",
                a("note_title"),
                a("expansion_type")
            )),
            "extract_insights" => {
                out.push_str(" - Extracted insights");
                if let Some(parent) = self.arg("parent_note") {
                    out.push_str(&format!(" from \"{parent}\""));
                }
            }
            "create_exploration_path" => {
                out.push_str(&format!(" - Created path for \"{}\"", a("topic")))
            }
            "exploration_start" => {
                out.push_str(&format!(" - Started exploration on \"{}\"", a("seed_topic")))
            }
            "create_seed_note" => {
                out.push_str(&format!(" - Created seed note \"{}\"", a("title")))
            }
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_envelopes() {
        let m: ServerMsg =
            serde_json::from_str(r#"{"type":"garden_update","file":"notes/rust.md"}"#).unwrap();
        assert_eq!(
            m,
            ServerMsg::GardenUpdate {
                file: "notes/rust.md".into()
            }
        );

        let m: ServerMsg = serde_json::from_str(
            r#"{"type":"tool_usage","data":{"tool":"add_note","args":{"title":"X"}}}"#,
        )
        .unwrap();
        let ServerMsg::ToolUsage { data } = m else {
            panic!("expected tool_usage");
        };
        assert_eq!(data.created_title(), Some("X"));

        let m: ServerMsg = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert_eq!(m, ServerMsg::Pong);
    }

    #[test]
    fn unknown_kind_is_not_an_error() {
        let m: ServerMsg = serde_json::from_str(r#"{"type":"weather","temp":3}"#).unwrap();
        assert_eq!(m, ServerMsg::Unknown);
    }

    #[test]
    fn ping_wire_shape() {
        assert_eq!(
            serde_json::to_string(&ClientMsg::Ping).unwrap(),
            r#"{"type":"ping"}"#
        );
    }

    #[test]
    fn describe_covers_tool_specific_details() {
        let t = ToolUsage::new("extract_insights", json!({"parent_note": "Rust"}));
        assert_eq!(
            t.describe(),
            "Tool used: Extract Insights - Extracted insights from \"Rust\""
        );
        let t = ToolUsage::new("expand_knowledge", json!({"note_title": "Rust", "expansion_type": "depth"}));
        assert_eq!(
            t.describe(),
            "Tool used: Expand Knowledge - Expanded \"Rust\" (depth)"
        );
        let t = ToolUsage::new("custom_tool", Value::Null);
        assert_eq!(t.describe(), "Tool used: custom_tool");
        assert!(t.created_title().is_none());
    }
}
