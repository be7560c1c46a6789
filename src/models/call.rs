//! Call records extracted from conversation transcripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single call-center conversation.
///
/// Created once by the conversation importer and immutable afterward;
/// calls are never deleted by this system. The identifier is the
/// lowercase UUID assigned by the telephony platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Call identifier (lowercase UUID string).
    pub call_id: String,
    /// Name of the agent who handled the call.
    pub agent_name: String,
    /// Customer phone number, digits only, leading zero stripped.
    pub phone_number: String,
    /// Call duration in seconds.
    pub duration: Option<f64>,
    /// Agent speech rate percentage (0-100).
    pub agent_speech_rate: Option<f64>,
    /// Customer speech rate percentage (0-100).
    pub customer_speech_rate: Option<f64>,
    /// Silence rate percentage (0-100).
    pub silence_rate: Option<f64>,
    /// Cross talk rate percentage (0-100).
    pub cross_talk_rate: Option<f64>,
    /// Number of times the agent interrupted the customer.
    pub agent_interrupt_count: Option<i32>,
    /// When the call started.
    pub created_at: DateTime<Utc>,
}
