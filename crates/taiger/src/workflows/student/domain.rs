use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier wrapper for students.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

/// Identifier wrapper for student applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Tri-state answer used across TaiGer records (`"O"` yes, `"X"` no, `"-"` undecided).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Answer {
    Yes,
    No,
    #[default]
    Undecided,
}

impl Answer {
    pub const fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "O",
            Answer::No => "X",
            Answer::Undecided => "-",
        }
    }
}

impl From<Option<String>> for Answer {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("O") => Answer::Yes,
            Some("X") => Answer::No,
            _ => Answer::Undecided,
        }
    }
}

impl From<Answer> for String {
    fn from(value: Answer) -> Self {
        value.label().to_string()
    }
}

/// Graduation standing recorded in the academic background survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum GraduationStatus {
    Yes,
    No,
    Pending,
    #[default]
    Unknown,
}

impl GraduationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            GraduationStatus::Yes => "Yes",
            GraduationStatus::No => "No",
            GraduationStatus::Pending => "pending",
            GraduationStatus::Unknown => "-",
        }
    }

    /// Students who graduated or are about to graduate owe a course table.
    pub const fn expects_course_table(self) -> bool {
        matches!(self, GraduationStatus::Yes | GraduationStatus::Pending)
    }
}

impl From<Option<String>> for GraduationStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("Yes") => GraduationStatus::Yes,
            Some("No") => GraduationStatus::No,
            Some("pending") => GraduationStatus::Pending,
            _ => GraduationStatus::Unknown,
        }
    }
}

impl From<GraduationStatus> for String {
    fn from(value: GraduationStatus) -> Self {
        value.label().to_string()
    }
}

/// Language certificate state (`"O"` passed, `"X"` test planned, `"--"` not needed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum LanguageStatus {
    Passed,
    Planned,
    NotNeeded,
    #[default]
    Unknown,
}

impl LanguageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LanguageStatus::Passed => "O",
            LanguageStatus::Planned => "X",
            LanguageStatus::NotNeeded => "--",
            LanguageStatus::Unknown => "-",
        }
    }
}

impl From<Option<String>> for LanguageStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("O") => LanguageStatus::Passed,
            Some("X") => LanguageStatus::Planned,
            Some("--") => LanguageStatus::NotNeeded,
            _ => LanguageStatus::Unknown,
        }
    }
}

impl From<LanguageStatus> for String {
    fn from(value: LanguageStatus) -> Self {
        value.label().to_string()
    }
}

/// Review state of an uploaded base document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum DocumentStatus {
    Uploaded,
    Accepted,
    Rejected,
    NotNeeded,
    #[default]
    Missing,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Accepted => "accepted",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::NotNeeded => "notneeded",
            DocumentStatus::Missing => "missing",
        }
    }

    pub const fn is_settled(self) -> bool {
        matches!(
            self,
            DocumentStatus::Uploaded | DocumentStatus::Accepted | DocumentStatus::NotNeeded
        )
    }
}

impl From<Option<String>> for DocumentStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("uploaded") => DocumentStatus::Uploaded,
            Some("accepted") => DocumentStatus::Accepted,
            Some("rejected") => DocumentStatus::Rejected,
            Some("notneeded") => DocumentStatus::NotNeeded,
            _ => DocumentStatus::Missing,
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(value: DocumentStatus) -> Self {
        value.label().to_string()
    }
}

/// Program metadata embedded in an application. Owned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Program {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: ProgramId,
    pub school: Option<String>,
    pub program_name: Option<String>,
    pub degree: Option<String>,
    pub semester: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "updatedAt", deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    pub uni_assist: Option<String>,
    pub application_portal_a: Option<String>,
    pub application_portal_b: Option<String>,
}

impl Program {
    pub fn display_name(&self) -> String {
        match (self.school.as_deref(), self.program_name.as_deref()) {
            (Some(school), Some(name)) => format!("{school} - {name}"),
            (Some(school), None) => school.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => self.id.0.clone(),
        }
    }

    /// Programs listed as VPD or full Uni-Assist require an upload before submission.
    pub fn requires_uni_assist(&self) -> bool {
        self.uni_assist
            .as_deref()
            .map(|value| {
                let value = value.to_ascii_lowercase();
                value.contains("vpd") || value.contains("full")
            })
            .unwrap_or(false)
    }

    pub fn requires_portal_a(&self) -> bool {
        filled(&self.application_portal_a)
    }

    pub fn requires_portal_b(&self) -> bool {
        filled(&self.application_portal_b)
    }
}

/// `programId` is either populated with the program or left as a bare reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramRef {
    Embedded(Box<Program>),
    Reference(ProgramId),
}

impl ProgramRef {
    pub fn program(&self) -> Option<&Program> {
        match self {
            ProgramRef::Embedded(program) => Some(program),
            ProgramRef::Reference(_) => None,
        }
    }
}

/// Populated or bare reference to a document thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreadRef {
    Populated(ThreadSummary),
    Id(String),
}

impl ThreadRef {
    pub fn id(&self) -> &str {
        match self {
            ThreadRef::Populated(summary) => &summary.id,
            ThreadRef::Id(id) => id,
        }
    }

    pub fn file_type(&self) -> Option<&str> {
        match self {
            ThreadRef::Populated(summary) => summary.file_type.as_deref(),
            ThreadRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadSummary {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    pub file_type: Option<String>,
}

/// Document feedback thread entry attached to a student or an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadEntry {
    pub doc_thread_id: Option<ThreadRef>,
    #[serde(rename = "isFinalVersion", deserialize_with = "null_as_default")]
    pub is_final_version: bool,
    pub latest_message_left_by_id: Option<String>,
}

impl ThreadEntry {
    /// A thread waits on the student while it is open and the student did not reply last.
    pub fn is_awaiting(&self, student_id: &StudentId) -> bool {
        !self.is_final_version
            && self.latest_message_left_by_id.as_deref() != Some(student_id.0.as_str())
    }

    pub fn file_type(&self) -> &str {
        self.doc_thread_id
            .as_ref()
            .and_then(ThreadRef::file_type)
            .unwrap_or("Document")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniAssist {
    #[serde(deserialize_with = "null_as_default")]
    pub status: UniAssistStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum UniAssistStatus {
    Uploaded,
    NotNeeded,
    #[default]
    NotStarted,
}

impl From<Option<String>> for UniAssistStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("uploaded") => UniAssistStatus::Uploaded,
            Some("notneeded") => UniAssistStatus::NotNeeded,
            _ => UniAssistStatus::NotStarted,
        }
    }
}

impl From<UniAssistStatus> for String {
    fn from(value: UniAssistStatus) -> Self {
        match value {
            UniAssistStatus::Uploaded => "uploaded",
            UniAssistStatus::NotNeeded => "notneeded",
            UniAssistStatus::NotStarted => "notstarted",
        }
        .to_string()
    }
}

/// One student-program pairing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: ApplicationId,
    #[serde(rename = "programId")]
    pub program_id: Option<ProgramRef>,
    #[serde(rename = "isLocked", deserialize_with = "null_as_default")]
    pub is_locked: bool,
    pub decided: Answer,
    pub closed: Answer,
    pub admission: Answer,
    #[serde(deserialize_with = "null_as_default")]
    pub doc_modification_thread: Vec<ThreadEntry>,
    pub uni_assist: Option<UniAssist>,
    #[serde(deserialize_with = "null_as_default")]
    pub credential_a_filled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub credential_b_filled: bool,
}

impl Application {
    pub fn program(&self) -> Option<&Program> {
        self.program_id.as_ref().and_then(ProgramRef::program)
    }

    pub const fn is_program_decided(&self) -> bool {
        self.decided.is_yes()
    }

    pub const fn is_submitted(&self) -> bool {
        self.closed.is_yes()
    }

    pub const fn is_admitted(&self) -> bool {
        self.admission.is_yes()
    }

    pub fn admission_known(&self) -> bool {
        self.admission != Answer::Undecided
    }

    pub fn program_label(&self) -> String {
        self.program()
            .map(Program::display_name)
            .unwrap_or_else(|| self.id.0.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct University {
    pub attended_high_school: Option<String>,
    pub attended_university: Option<String>,
    pub attended_university_program: Option<String>,
    #[serde(rename = "isGraduated")]
    pub is_graduated: GraduationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageRecord {
    #[serde(rename = "english_isPassed")]
    pub english_is_passed: LanguageStatus,
    pub english_certificate: Option<String>,
    pub english_score: Option<String>,
    pub english_test_date: Option<String>,
    #[serde(rename = "german_isPassed")]
    pub german_is_passed: LanguageStatus,
    pub german_certificate: Option<String>,
    pub german_score: Option<String>,
    pub german_test_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicBackground {
    #[serde(deserialize_with = "null_as_default")]
    pub university: University,
    #[serde(deserialize_with = "null_as_default")]
    pub language: LanguageRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPreference {
    pub expected_application_date: Option<String>,
    pub expected_application_semester: Option<String>,
    pub target_application_field: Option<String>,
    pub target_degree: Option<String>,
    pub target_program_language: Option<String>,
}

/// Base document slot on the student profile (passport, CV, transcripts, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub status: DocumentStatus,
    #[serde(deserialize_with = "null_as_required")]
    pub required: bool,
}

impl Default for BaseDocument {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: DocumentStatus::Missing,
            required: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRow {
    pub all_course_chinese: Option<String>,
    pub all_course_english: Option<String>,
    pub course_credits: Option<String>,
    pub course_grade: Option<String>,
}

impl CourseRow {
    pub fn is_named(&self) -> bool {
        filled(&self.all_course_chinese) || filled(&self.all_course_english)
    }
}

/// Snapshot of a student and the nested records the dashboards read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: StudentId,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub firstname_chinese: Option<String>,
    pub lastname_chinese: Option<String>,
    pub birthday: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub academic_background: AcademicBackground,
    #[serde(deserialize_with = "null_as_default")]
    pub application_preference: ApplicationPreference,
    #[serde(deserialize_with = "null_as_default")]
    pub applications: Vec<Application>,
    #[serde(deserialize_with = "null_as_default")]
    pub generaldocs_threads: Vec<ThreadEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub profile: Vec<BaseDocument>,
    #[serde(deserialize_with = "null_as_default")]
    pub courses: Vec<CourseRow>,
    #[serde(deserialize_with = "boolean_flags")]
    pub notification: Option<BTreeMap<String, bool>>,
    #[serde(deserialize_with = "null_as_default")]
    pub archiv: bool,
}

impl Student {
    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| &application.id == id)
    }

    pub fn decided_applications(&self) -> impl Iterator<Item = &Application> {
        self.applications
            .iter()
            .filter(|application| application.is_program_decided())
    }

    pub fn display_name(&self) -> String {
        match (self.firstname.as_deref(), self.lastname.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.id.0.clone(),
        }
    }
}

/// True when an optional text field carries something other than whitespace.
pub(crate) fn filled(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse an RFC 3339 timestamp, reading anything else as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text.trim()).ok())
        .map(|stamp| stamp.with_timezone(&Utc)))
}

/// Base documents are required unless the server says otherwise.
fn null_as_required<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_bool).unwrap_or(true))
}

/// Keep only the boolean entries of a flag map.
fn boolean_flags<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(entries)) = raw else {
        return Ok(None);
    };
    Ok(Some(
        entries
            .into_iter()
            .filter_map(|(key, value)| value.as_bool().map(|flag| (key, flag)))
            .collect(),
    ))
}
