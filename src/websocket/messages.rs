//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! dashboard clients and the server.

use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;
use crate::dashboard::{ControlError, ControlEvent, TabView, Update};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Tab strip selection
    SelectTab { tab: String },
    /// State multi-select value
    SetStates { states: Vec<String> },
    /// Y-axis scale selector value
    SetScale { scale: String },
    /// Metric selector value
    SetMetric { metric: String },
    /// Ping for keepalive
    Ping,
}

impl ClientMessage {
    /// Control event carried by this message; `None` for keepalives
    pub fn into_event(self) -> Option<ControlEvent> {
        match self {
            ClientMessage::SelectTab { tab } => Some(ControlEvent::TabSelected(tab)),
            ClientMessage::SetStates { states } => Some(ControlEvent::StatesChanged(states)),
            ClientMessage::SetScale { scale } => Some(ControlEvent::ScaleChanged(scale)),
            ClientMessage::SetMetric { metric } => Some(ControlEvent::MetricChanged(metric)),
            ClientMessage::Ping => None,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session established
    Connected {
        /// Unique session identifier
        session_id: String,
    },
    /// Replace the whole tab content
    Tab { view: TabView },
    /// Replace the chart on the active tab
    Chart { chart: ChartSpec },
    /// Event rejected; the displayed chart is unchanged
    Error { code: String, message: String },
    /// Pong response to ping
    Pong,
}

impl ServerMessage {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<Update> for ServerMessage {
    fn from(update: Update) -> Self {
        match update {
            Update::Tab(view) => ServerMessage::Tab { view },
            Update::Chart(chart) => ServerMessage::Chart { chart },
        }
    }
}

impl From<&ControlError> for ServerMessage {
    fn from(err: &ControlError) -> Self {
        ServerMessage::error(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartError, Layout};

    #[test]
    fn test_client_message_deserialize_set_states() {
        let json = r#"{"type": "set_states", "states": ["MD", "VA"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg.into_event(),
            Some(ControlEvent::StatesChanged(vec!["MD".into(), "VA".into()]))
        );
    }

    #[test]
    fn test_client_message_deserialize_select_tab() {
        let json = r#"{"type": "select_tab", "tab": "us-state-map"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg.into_event(),
            Some(ControlEvent::TabSelected("us-state-map".into()))
        );
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
        assert_eq!(msg.into_event(), None);
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let json = r#"{"type": "subscribe", "topics": []}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_chart() {
        let msg = ServerMessage::from(Update::Chart(ChartSpec {
            traces: Vec::new(),
            layout: Layout::default(),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "chart");
        assert!(json["chart"]["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_server_message_serialize_error() {
        let err = ControlError::from(ChartError::InvalidScale("sqrt".to_string()));
        let json = serde_json::to_string(&ServerMessage::from(&err)).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"code\":\"INVALID_SCALE\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            session_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"session_id\":\"abc-123\""));
    }
}
