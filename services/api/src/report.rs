use crate::infra::{load_students, parse_timestamp, InMemoryStudentGateway, TracingNotifier};
use chrono::{DateTime, Utc};
use clap::Args;
use std::fmt::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use taiger::config::AppConfig;
use taiger::error::AppError;
use taiger::workflows::student::{
    ApplicationLockView, GatewayError, Role, StudentDashboardService, StudentDashboardView,
    StudentId,
};

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// JSON file holding one student snapshot or an array of them
    #[arg(long)]
    pub(crate) student: PathBuf,
    /// Student to report on when the file holds several (defaults to the first)
    #[arg(long)]
    pub(crate) student_id: Option<String>,
    /// Role viewing the dashboard (Admin, Manager, Agent, Editor, Student, Guest)
    #[arg(long, default_value = "Agent")]
    pub(crate) role: Role,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Enable the Uni-Assist task regardless of APP_VPD_ENABLE
    #[arg(long)]
    pub(crate) vpd: bool,
    /// Print the dashboard payload as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_dashboard_report(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        student,
        student_id,
        role,
        now,
        vpd,
        json,
    } = args;

    let config = AppConfig::load()?;
    let mut features = config.features;
    features.vpd_enable |= vpd;

    let students = load_students(&student)?;
    let id = match student_id {
        Some(id) => StudentId(id),
        None => students
            .first()
            .map(|student| student.id.clone())
            .ok_or_else(|| AppError::Dashboard(GatewayError::NotFound.into()))?,
    };

    let service = StudentDashboardService::new(
        Arc::new(InMemoryStudentGateway::from_students(students)),
        Arc::new(TracingNotifier),
        config.lock,
        features,
    );
    let now = now.unwrap_or_else(Utc::now);
    let view = service.dashboard(&id, role, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_dashboard(&view, role, now));
    }
    Ok(())
}

pub(crate) fn render_dashboard(
    view: &StudentDashboardView,
    role: Role,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    write_dashboard(&mut out, view, role, now).ok();
    out
}

fn write_dashboard(
    out: &mut String,
    view: &StudentDashboardView,
    role: Role,
    now: DateTime<Utc>,
) -> fmt::Result {
    let tasks = &view.tasks;

    writeln!(
        out,
        "Dashboard for {} ({}) as {} at {}",
        view.student_name,
        view.student_id,
        role,
        now.format("%Y-%m-%d %H:%M UTC")
    )?;
    if view.archived {
        writeln!(out, "  (archived student)")?;
    }
    writeln!(
        out,
        "Progress: {}/{} units complete ({}%)",
        tasks.completed, tasks.total, tasks.percentage
    )?;

    if tasks.tasks.is_empty() {
        writeln!(out, "\nNo open tasks.")?;
    } else {
        writeln!(out, "\nOpen tasks:")?;
        for task in &tasks.tasks {
            writeln!(
                out,
                "  [{:<6}] {} -> {}",
                task.priority.label(),
                task.title,
                task.link
            )?;
            writeln!(out, "           {}", task.description)?;
        }
    }

    if !view.applications.is_empty() {
        writeln!(out, "\nApplications:")?;
        for application in &view.applications {
            writeln!(out, "  {}", lock_line(application))?;
        }
    }

    if !view.banners.is_empty() {
        writeln!(out, "\nUnread banners:")?;
        for banner in &view.banners {
            writeln!(out, "  - {}", banner.flag())?;
        }
    }

    Ok(())
}

fn lock_line(application: &ApplicationLockView) -> String {
    let decided = if application.decided { "decided" } else { "open" };
    let Some(controls) = application.controls.as_ref() else {
        return format!(
            "{:<10} {} [{decided}] program not loaded",
            application.application_id, application.program
        );
    };

    let state = match controls.status.reason {
        Some(reason) => format!("locked: {}", reason.label()),
        None => "unlocked".to_string(),
    };
    let mut actions = Vec::new();
    if let Some(unlock) = controls.unlock {
        actions.push(if unlock.enabled {
            "unlock"
        } else {
            "unlock (disabled)"
        });
    }
    if controls.check_program {
        actions.push("check program");
    }
    let actions = if actions.is_empty() {
        String::new()
    } else {
        format!(" | actions: {}", actions.join(", "))
    };

    format!(
        "{:<10} {} [{decided}] {state}{actions}",
        application.application_id, application.program
    )
}
