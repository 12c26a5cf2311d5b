use serde::Serialize;

use super::super::domain::Student;

/// Dismissable dashboard banners backed by the student's `notification` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    SurveyNotComplete,
    BaseDocumentsMissing,
    BaseDocumentsRejected,
    CourseNotComplete,
    UniAssistTaskAssigned,
    NewProgramsAssigned,
    NewDocumentMessage,
}

impl Banner {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::SurveyNotComplete,
            Self::BaseDocumentsMissing,
            Self::BaseDocumentsRejected,
            Self::CourseNotComplete,
            Self::UniAssistTaskAssigned,
            Self::NewProgramsAssigned,
            Self::NewDocumentMessage,
        ]
    }

    /// Key of the read flag in the `notification` map.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::SurveyNotComplete => "isRead_survey_not_complete",
            Self::BaseDocumentsMissing => "isRead_base_documents_missing",
            Self::BaseDocumentsRejected => "isRead_base_documents_rejected",
            Self::CourseNotComplete => "isRead_course_not_complete",
            Self::UniAssistTaskAssigned => "isRead_uni_assist_task_assigned",
            Self::NewProgramsAssigned => "isRead_new_programs_assigned",
            Self::NewDocumentMessage => "isRead_new_cvmlrl_messsage",
        }
    }
}

/// Banners whose read flag is explicitly `false`. No map means nothing to show.
pub fn unread_banners(student: &Student) -> Vec<Banner> {
    let Some(notification) = student.notification.as_ref() else {
        return Vec::new();
    };

    Banner::ordered()
        .into_iter()
        .filter(|banner| notification.get(banner.flag()) == Some(&false))
        .collect()
}
