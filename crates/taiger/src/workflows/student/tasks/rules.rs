use super::super::domain::{
    filled, Application, GraduationStatus, LanguageStatus, Student, ThreadEntry, UniAssistStatus,
};
use super::{TaskFlags, TaskItem, TaskPriority};

#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub completed: usize,
    pub total: usize,
    pub tasks: Vec<TaskItem>,
}

impl Tally {
    fn check(&mut self, done: bool, pending: impl FnOnce() -> TaskItem) {
        self.total += 1;
        if done {
            self.completed += 1;
        } else {
            self.tasks.push(pending());
        }
    }

    fn pending(&mut self, item: TaskItem) {
        self.total += 1;
        self.tasks.push(item);
    }
}

fn task(
    key: impl Into<String>,
    priority: TaskPriority,
    title: impl Into<String>,
    description: impl Into<String>,
    link: impl Into<String>,
    link_text: &str,
) -> TaskItem {
    TaskItem {
        key: key.into(),
        priority,
        title: title.into(),
        description: description.into(),
        link: link.into(),
        link_text: link_text.to_string(),
    }
}

/// Runs every predicate in dashboard order. Each one is independent of the others.
pub(crate) fn collect(student: &Student, flags: &TaskFlags) -> Tally {
    let mut tally = Tally::default();

    check_profile(student, &mut tally);
    check_course_table(student, &mut tally);
    let decided = check_program_decision(student, &mut tally);
    if decided {
        check_results_update(student, &mut tally);
    }
    check_visa(student, &mut tally);
    if flags.vpd_enable {
        check_uni_assist(student, &mut tally);
    }
    check_personal_data(student, &mut tally);
    check_base_documents(student, &mut tally);
    check_portal_registration(student, &mut tally);
    check_general_threads(student, &mut tally);
    check_application_threads(student, &mut tally);

    tally
}

fn check_profile(student: &Student, tally: &mut Tally) {
    tally.check(academic_background_filled(student), || {
        task(
            "survey_academic_background",
            TaskPriority::High,
            "Complete academic background",
            "Fill in your high school, university and graduation status.",
            "/survey",
            "Go to survey",
        )
    });
    tally.check(languages_filled(student), || {
        task(
            "survey_language",
            TaskPriority::High,
            "Complete language information",
            "Provide your English and German certificate or test dates.",
            "/survey",
            "Go to survey",
        )
    });
    tally.check(application_preference_filled(student), || {
        task(
            "survey_application_preference",
            TaskPriority::High,
            "Complete application preference",
            "Tell us your target semester, degree, field and program language.",
            "/survey",
            "Go to survey",
        )
    });
}

pub(crate) fn academic_background_filled(student: &Student) -> bool {
    let university = &student.academic_background.university;
    filled(&university.attended_high_school)
        && filled(&university.attended_university)
        && filled(&university.attended_university_program)
        && university.is_graduated != GraduationStatus::Unknown
}

pub(crate) fn languages_filled(student: &Student) -> bool {
    let language = &student.academic_background.language;
    language_filled(
        language.english_is_passed,
        &language.english_certificate,
        &language.english_score,
        &language.english_test_date,
    ) && language_filled(
        language.german_is_passed,
        &language.german_certificate,
        &language.german_score,
        &language.german_test_date,
    )
}

fn language_filled(
    status: LanguageStatus,
    certificate: &Option<String>,
    score: &Option<String>,
    test_date: &Option<String>,
) -> bool {
    match status {
        LanguageStatus::Passed => filled(certificate) && filled(score),
        LanguageStatus::Planned => filled(test_date),
        LanguageStatus::NotNeeded => true,
        LanguageStatus::Unknown => false,
    }
}

pub(crate) fn application_preference_filled(student: &Student) -> bool {
    let preference = &student.application_preference;
    filled(&preference.expected_application_date)
        && filled(&preference.expected_application_semester)
        && filled(&preference.target_application_field)
        && filled(&preference.target_degree)
        && filled(&preference.target_program_language)
}

fn check_course_table(student: &Student, tally: &mut Tally) {
    if !student
        .academic_background
        .university
        .is_graduated
        .expects_course_table()
    {
        return;
    }

    let done = student.courses.iter().any(|row| row.is_named());
    tally.check(done, || {
        task(
            "courses",
            TaskPriority::High,
            "Complete course table",
            "Enter the courses from your transcript for the course analysis.",
            "/my-courses",
            "Go to courses",
        )
    });
}

/// Returns whether at least one application is decided.
fn check_program_decision(student: &Student, tally: &mut Tally) -> bool {
    if student.applications.is_empty() {
        return false;
    }

    let decided = student.decided_applications().next().is_some();
    tally.check(decided, || {
        task(
            "decide_programs",
            TaskPriority::High,
            "Decide your programs",
            "Confirm which of the assigned programs you want to apply for.",
            "/student-applications",
            "Go to applications",
        )
    });
    decided
}

fn check_results_update(student: &Student, tally: &mut Tally) {
    let missing: Vec<String> = student
        .decided_applications()
        .filter(|application| application.is_submitted())
        .filter(|application| !application.admission_known())
        .map(Application::program_label)
        .collect();

    tally.check(missing.is_empty(), || {
        task(
            "update_results",
            TaskPriority::Medium,
            "Update application results",
            format!("Report the admission result for: {}", missing.join(", ")),
            "/student-applications",
            "Update results",
        )
    });
}

fn check_visa(student: &Student, tally: &mut Tally) {
    if !student.applications.iter().any(Application::is_admitted) {
        return;
    }

    tally.pending(task(
        "visa",
        TaskPriority::Low,
        "Prepare your visa",
        "You have an admission. Start collecting the documents for your student visa.",
        "/visa",
        "Go to visa",
    ));
}

fn check_uni_assist(student: &Student, tally: &mut Tally) {
    let missing: Vec<String> = student
        .decided_applications()
        .filter(|application| {
            application
                .program()
                .map(|program| program.requires_uni_assist())
                .unwrap_or(false)
        })
        .filter(|application| {
            let status = application
                .uni_assist
                .map(|uni_assist| uni_assist.status)
                .unwrap_or_default();
            !matches!(
                status,
                UniAssistStatus::Uploaded | UniAssistStatus::NotNeeded
            )
        })
        .map(Application::program_label)
        .collect();

    tally.check(missing.is_empty(), || {
        task(
            "uni_assist",
            TaskPriority::High,
            "Upload Uni-Assist documents",
            format!("Uni-Assist documents are missing for: {}", missing.join(", ")),
            "/uni-assist",
            "Go to Uni-Assist",
        )
    });
}

pub(crate) fn personal_data_filled(student: &Student) -> bool {
    filled(&student.firstname)
        && filled(&student.lastname)
        && filled(&student.firstname_chinese)
        && filled(&student.lastname_chinese)
        && filled(&student.birthday)
}

fn check_personal_data(student: &Student, tally: &mut Tally) {
    tally.check(personal_data_filled(student), || {
        task(
            "personal_data",
            TaskPriority::High,
            "Complete personal data",
            "Your name in both scripts and your birthday are required for applications.",
            "/profile",
            "Go to profile",
        )
    });
}

fn check_base_documents(student: &Student, tally: &mut Tally) {
    let outstanding: Vec<&str> = student
        .profile
        .iter()
        .filter(|document| document.required && !document.status.is_settled())
        .map(|document| document.name.as_str())
        .collect();
    let done = !student.profile.is_empty() && outstanding.is_empty();

    tally.check(done, || {
        let description = if outstanding.is_empty() {
            "Upload your base documents.".to_string()
        } else {
            format!(
                "Missing or rejected base documents: {}",
                outstanding.join(", ")
            )
        };
        task(
            "base_documents",
            TaskPriority::High,
            "Upload base documents",
            description,
            "/base-documents",
            "Go to base documents",
        )
    });
}

fn check_portal_registration(student: &Student, tally: &mut Tally) {
    let missing: Vec<String> = student
        .decided_applications()
        .filter(|application| {
            application
                .program()
                .map(|program| {
                    (program.requires_portal_a() && !application.credential_a_filled)
                        || (program.requires_portal_b() && !application.credential_b_filled)
                })
                .unwrap_or(false)
        })
        .map(Application::program_label)
        .collect();

    tally.check(missing.is_empty(), || {
        task(
            "portal_registration",
            TaskPriority::Medium,
            "Register application portals",
            format!(
                "Create portal accounts and store the credentials for: {}",
                missing.join(", ")
            ),
            "/portal-informations",
            "Go to portals",
        )
    });
}

fn thread_task(key_prefix: &str, entry: &ThreadEntry, index: usize, context: &str) -> TaskItem {
    let (key, link) = match entry.doc_thread_id.as_ref() {
        Some(thread) => (
            format!("{key_prefix}_{}", thread.id()),
            format!("/document-modification/{}", thread.id()),
        ),
        None => (format!("{key_prefix}_{index}"), "/cv-ml-rl-center".to_string()),
    };

    task(
        key,
        TaskPriority::High,
        format!("Reply to {} feedback", entry.file_type()),
        format!("Your editor is waiting for your response on {context}."),
        link,
        "Open thread",
    )
}

fn check_general_threads(student: &Student, tally: &mut Tally) {
    for (index, entry) in student.generaldocs_threads.iter().enumerate() {
        if entry.is_awaiting(&student.id) {
            tally.pending(thread_task("general_thread", entry, index, "your general documents"));
        }
    }
}

fn check_application_threads(student: &Student, tally: &mut Tally) {
    for application in student.decided_applications() {
        let context = application.program_label();
        let key_prefix = format!("program_thread_{}", application.id.0);
        for (index, entry) in application.doc_modification_thread.iter().enumerate() {
            if entry.is_awaiting(&student.id) {
                tally.pending(thread_task(&key_prefix, entry, index, &context));
            }
        }
    }
}
