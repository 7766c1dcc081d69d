#[cfg(test)]
#[path = "task_test.rs"]
mod tests;

use strum::EnumIter;
use strum::EnumVariantNames;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TaskStatus {
    Completed,
    InProgress,
    Pending,
    Overdue,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        return match self {
            TaskStatus::Completed => "Done",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Pending => "Pending",
            TaskStatus::Overdue => "Overdue",
        };
    }
}

/// One step of the onboarding checklist. `due` is display text such as
/// "Due in 2 days".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnboardingTask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due: String,
}

impl OnboardingTask {
    fn new(id: u32, title: &str, description: &str, status: TaskStatus, due: &str) -> OnboardingTask {
        return OnboardingTask {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            due: due.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpcomingEvent {
    pub title: String,
    pub date: String,
    pub time: String,
}

pub fn seed_onboarding_tasks() -> Vec<OnboardingTask> {
    return vec![
        OnboardingTask::new(
            1,
            "Document Verification",
            "Upload identity & academic documents",
            TaskStatus::Completed,
            "Completed",
        ),
        OnboardingTask::new(
            2,
            "Fee Payment – Semester 1",
            "Pay tuition and hostel fees",
            TaskStatus::Completed,
            "Completed",
        ),
        OnboardingTask::new(
            3,
            "Course Registration",
            "Select electives and lab sections",
            TaskStatus::InProgress,
            "Due in 2 days",
        ),
        OnboardingTask::new(
            4,
            "LMS Onboarding",
            "Complete Moodle setup & orientation module",
            TaskStatus::InProgress,
            "Due in 4 days",
        ),
        OnboardingTask::new(
            5,
            "Hostel Allocation",
            "Confirm room preference & allocation",
            TaskStatus::Pending,
            "Due in 7 days",
        ),
        OnboardingTask::new(
            6,
            "Faculty Mentor Meeting",
            "Schedule first meeting with assigned mentor",
            TaskStatus::Pending,
            "Due in 10 days",
        ),
        OnboardingTask::new(
            7,
            "Anti-Ragging Compliance",
            "Sign declaration & complete awareness module",
            TaskStatus::Overdue,
            "Overdue by 1 day",
        ),
    ];
}

pub fn seed_upcoming_events() -> Vec<UpcomingEvent> {
    return [
        ("Orientation Day", "Feb 20", "9:00 AM"),
        ("Lab Safety Training", "Feb 22", "2:00 PM"),
        ("Department Welcome", "Feb 25", "10:00 AM"),
    ]
    .iter()
    .map(|(title, date, time)| {
        return UpcomingEvent {
            title: title.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        };
    })
    .collect();
}

pub fn completed_count(tasks: &[OnboardingTask]) -> usize {
    return tasks
        .iter()
        .filter(|task| return task.status == TaskStatus::Completed)
        .count();
}

/// Whole-number share of completed tasks, rounded half away from zero. An
/// empty checklist counts as 0%.
pub fn onboarding_progress(tasks: &[OnboardingTask]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }

    let share = completed_count(tasks) as f64 / tasks.len() as f64;
    return (share * 100.0).round() as u32;
}
