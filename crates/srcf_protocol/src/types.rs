//! Domain record types: the job state machine and the member/society/domain
//! data model these jobs act on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Newtype around the job table's auto-increment primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub i64);

impl JobId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job's position in the state machine described in the job dispatch
/// component design: `unapproved -> queued -> running -> {done, failed}`,
/// plus the `withdrawn` dead end and the operator-triggered `retry`/`repeat`
/// loops back to `queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Unapproved,
    Queued,
    Running,
    Done,
    Failed,
    Withdrawn,
}

impl JobState {
    /// The literal string stored in the `jobs.state` column.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobState::Unapproved => "unapproved",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Done => "done",
            JobState::Failed => "failed",
            JobState::Withdrawn => "withdrawn",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.as_db_str()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "unapproved" => JobState::Unapproved,
            "queued" => JobState::Queued,
            "running" => JobState::Running,
            "done" => JobState::Done,
            "failed" => JobState::Failed,
            "withdrawn" => JobState::Withdrawn,
            other => return Err(ProtocolError::UnknownJobState(other.to_string())),
        })
    }
}

/// Severity of a job-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "critical" => LogLevel::Critical,
            other => return Err(ProtocolError::UnknownLogLevel(other.to_string())),
        })
    }
}

/// What a job-log entry records: the lifecycle marker of a job step, not its
/// severity (that's `LogLevel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Started,
    Progress,
    Output,
    Done,
    Failed,
    Note,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Started => "started",
            LogType::Progress => "progress",
            LogType::Output => "output",
            LogType::Done => "done",
            LogType::Failed => "failed",
            LogType::Note => "note",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "started" => LogType::Started,
            "progress" => LogType::Progress,
            "output" => LogType::Output,
            "done" => LogType::Done,
            "failed" => LogType::Failed,
            "note" => LogType::Note,
            other => return Err(ProtocolError::UnknownLogType(other.to_string())),
        })
    }
}

/// How incoming mail for a member is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailHandler {
    /// Forwarded elsewhere via `.forward`.
    Forward,
    /// Delivered to the SRCF's own legacy mailbox (`pip`).
    Pip,
    /// Delivered via the Hades mail platform.
    Hades,
}

impl MailHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailHandler::Forward => "forward",
            MailHandler::Pip => "pip",
            MailHandler::Hades => "hades",
        }
    }
}

impl fmt::Display for MailHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailHandler {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "forward" => MailHandler::Forward,
            "pip" => MailHandler::Pip,
            "hades" => MailHandler::Hades,
            other => return Err(ProtocolError::UnknownMailHandler(other.to_string())),
        })
    }
}

/// A registered SRCF member. Primary key `crsid`, always canonical-lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub crsid: String,
    pub preferred_name: String,
    pub surname: String,
    pub email: String,
    pub mail_handler: MailHandler,
    /// Ever registered, regardless of current activity.
    pub member: bool,
    /// Currently active (has a live UNIX account).
    pub user: bool,
    pub danger: bool,
    pub notes: Option<String>,
    pub uid: Option<i32>,
    pub gid: Option<i32>,
    pub joined: Option<DateTime<Utc>>,
}

impl Member {
    /// `"Firstname Surname"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.preferred_name, self.surname)
    }
}

/// A registered SRCF society (group account). Primary key is its short name,
/// 1-16 lower-case characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Society {
    pub society: String,
    pub description: String,
    pub role_email: Option<String>,
    pub danger: bool,
    pub notes: Option<String>,
    pub uid: Option<i32>,
    pub gid: Option<i32>,
    pub joined: Option<DateTime<Utc>>,
    /// crsids of the society's current admins. Order is not meaningful.
    pub admin_crsids: Vec<String>,
}

impl Society {
    /// The derived `<name>-admins@` alias.
    pub fn admins_alias(&self) -> String {
        format!("{}-admins@srcf.net", self.society)
    }
}

/// Either a Member or a Society: the entity a Domain, job, or mailing list
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Owner {
    Member(Member),
    Society(Society),
}

/// External DNS name mapped to an owner, with optional document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: i64,
    pub domain: String,
    pub owner_name: String,
    pub root: Option<String>,
    pub wild: bool,
    pub danger: bool,
    pub last_good: Option<DateTime<Utc>>,
}

/// A pending HTTPS certificate-issue queue entry referencing a Domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpsCert {
    pub id: i64,
    pub domain_id: i64,
    pub danger: bool,
}

/// An append-only job-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub id: i64,
    pub job_id: JobId,
    pub level: LogLevel,
    pub log_type: LogType,
    pub message: String,
    pub raw: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// A (crsid, society) pair referencing an unregistered would-be admin,
/// consumed when the member is later created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAdmin {
    pub crsid: String,
    pub society: String,
}
