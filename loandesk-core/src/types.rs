use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a loan application as reported by the platform API.
///
/// Wire names are SCREAMING_SNAKE_CASE to match the backend enum. `Draft`
/// applications exist but belong to the applicant surface; the admin
/// console only ever moves applications between the other four states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// All statuses, in workflow order. Used for filter cycling and the
    /// status field of the bulk status-change modal.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Draft,
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    /// Wire value, e.g. `"UNDER_REVIEW"`. Also the value of the `status`
    /// filter query parameter on `GET /admin/applications`.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "DRAFT",
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }

    /// Human label for tables and modals, e.g. `"Under review"`.
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "Draft",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::UnderReview => "Under review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Whether an application in this status is waiting on an administrator.
    ///
    /// The notification centre's pending-review count sums exactly these.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::UnderReview
        )
    }
}

/// Categorical tag an administrator can attach to a status-change comment.
///
/// The allowed set depends on the target status — see [`ReasonCode::allowed_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    InsufficientIncome,
    BadCreditHistory,
    IncompleteDocuments,
    PolicyViolation,
}

impl ReasonCode {
    /// Label as it appears in the encoded comment prefix, e.g.
    /// `"Bad Credit History"`.
    pub fn label(self) -> &'static str {
        match self {
            ReasonCode::InsufficientIncome => "Insufficient Income",
            ReasonCode::BadCreditHistory => "Bad Credit History",
            ReasonCode::IncompleteDocuments => "Incomplete Documents",
            ReasonCode::PolicyViolation => "Policy Violation",
        }
    }

    /// Reason codes that may accompany a transition to `status`.
    ///
    /// Only rejections carry a reason; every other target status returns an
    /// empty slice and the modal hides the reason field entirely.
    pub fn allowed_for(status: ApplicationStatus) -> &'static [ReasonCode] {
        match status {
            ApplicationStatus::Rejected => &[
                ReasonCode::InsufficientIncome,
                ReasonCode::BadCreditHistory,
                ReasonCode::IncompleteDocuments,
                ReasonCode::PolicyViolation,
            ],
            _ => &[],
        }
    }
}

/// Loan product line. The platform originates working-capital loans for
/// small businesses and payroll-advance loans for their employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanProduct {
    Sme,
    Payroll,
}

impl LoanProduct {
    pub fn label(self) -> &'static str {
        match self {
            LoanProduct::Sme => "SME",
            LoanProduct::Payroll => "Payroll",
        }
    }
}

/// Account role on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Applicant,
    Reviewer,
    Admin,
}

impl UserRole {
    /// Wire value, e.g. `"REVIEWER"`. Also the value of the `role` filter
    /// query parameter on `GET /admin/users`.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Applicant => "APPLICANT",
            UserRole::Reviewer => "REVIEWER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserRole::Applicant => "Applicant",
            UserRole::Reviewer => "Reviewer",
            UserRole::Admin => "Admin",
        }
    }
}

/// Rows that can be displayed in a list pane and selected for bulk work.
///
/// The pane tracks the identity of its displayed rows through this id so it
/// can tell a genuinely new result set from a same-rows refresh.
pub trait HasId {
    fn id(&self) -> &str;
}

/// One loan application row from `GET /admin/applications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: String,
    pub applicant_name: String,
    pub business_name: Option<String>,
    pub product: LoanProduct,
    /// Requested principal in the platform currency.
    pub amount: f64,
    pub status: ApplicationStatus,
    /// Display name of the assigned reviewer, if any.
    pub reviewer: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl HasId for LoanApplication {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One account row from `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl HasId for UserAccount {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Roster entry for the reviewer-assignment modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub id: String,
    pub name: String,
}

impl From<&UserAccount> for Reviewer {
    fn from(user: &UserAccount) -> Self {
        Reviewer {
            id: user.id.clone(),
            name: user.full_name.clone(),
        }
    }
}

/// Per-status application count from `GET /admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub status: ApplicationStatus,
    pub count: u64,
}

/// One recent-activity line from `GET /admin/activity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    /// Display name of the account that performed the action.
    pub actor: String,
    /// Short human-readable description, e.g. `"approved LA-1042"`.
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A console session tied to a platform instance and operator.
///
/// Sessions are keyed by UUID v4 text. Each unique `api_url` + `operator`
/// pair produces a separate session on first launch; subsequent launches
/// resume the most-recent matching session so the local action log stays
/// attached to the right operator.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,      // UUID v4 text
    pub api_url: String,
    pub operator: String,
    pub created_at: i64, // Unix timestamp seconds
    pub updated_at: i64, // Unix timestamp seconds
}

/// Locally recorded outcome of one submitted bulk action.
///
/// Written after every bulk submit attempt, whether the backend accepted
/// the batch or not. `application_ids` is stored as JSON array text in
/// SQLite and decoded on read.
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub id: String, // UUID v4 text
    pub session_id: String,
    /// `"status_change"` or `"assign_reviewer"`.
    pub kind: String,
    pub application_ids: Vec<String>,
    /// Target status wire value or reviewer id, depending on `kind`.
    pub detail: String,
    /// Encoded comment as sent to the backend (may carry a reason prefix).
    pub comment: String,
    /// `"accepted"` or `"failed"`.
    pub outcome: String,
    pub created_at: i64,
}
