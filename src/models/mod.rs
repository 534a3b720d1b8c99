pub mod appointment;
pub mod chat;
pub mod identity;
pub mod risk;
pub mod roster;
pub mod vitals;

pub use appointment::Appointment;
pub use chat::{ChatAuthor, ChatReply, ChatRequest, ChatTurn};
pub use identity::{Identity, Role};
pub use risk::{risk_color, RiskAssessment, RiskColor, RiskLevel};
pub use roster::{FaqEntry, RosterEntry};
pub use vitals::{FormError, VitalField, VitalForm, VitalReading, VitalSubmission};
