//! WebSocket Dashboard Sessions
//!
//! Each WebSocket connection is one dashboard session.
//!
//! ## Architecture
//!
//! - **SessionHub**: Registry of active sessions and their outbound channels
//! - **Handler**: WebSocket upgrade and the per-session message loop
//! - **Messages**: Client and server message formats
//!
//! ## Usage
//!
//! On connect the server sends `connected` followed by the rendered
//! `state-positive` tab. Control changes are sent as messages; each one is
//! answered with a `chart`, a `tab` or an `error`:
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8050/api/v1/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'set_states', states: ['MD', 'VA']}));
//!   ws.send(JSON.stringify({type: 'set_scale', scale: 'log'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'chart') Plotly.react('chart', msg.chart.data, msg.chart.layout);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{HubConfig, HubError, SessionHub, SessionId, TabCounts};
pub use messages::{ClientMessage, ServerMessage};
