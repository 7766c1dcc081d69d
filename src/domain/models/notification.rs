#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Urgent,
    Deadline,
    Success,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u32,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub time: String,
    pub read: bool,
}

impl Notification {
    fn new(
        id: u32,
        kind: NotificationKind,
        title: &str,
        description: &str,
        time: &str,
        read: bool,
    ) -> Notification {
        return Notification {
            id,
            kind,
            title: title.to_string(),
            description: description.to_string(),
            time: time.to_string(),
            read,
        };
    }
}

pub fn seed_notifications() -> Vec<Notification> {
    return vec![
        Notification::new(
            1,
            NotificationKind::Urgent,
            "Anti-Ragging Compliance Overdue",
            "Complete the declaration form to avoid registration hold.",
            "1 hour ago",
            false,
        ),
        Notification::new(
            2,
            NotificationKind::Deadline,
            "Course Registration Closes in 2 Days",
            "Select your elective and lab section before Feb 22.",
            "3 hours ago",
            false,
        ),
        Notification::new(
            3,
            NotificationKind::Success,
            "Fee Payment Confirmed",
            "Tuition fee of ₹1,25,000 has been successfully processed.",
            "Yesterday",
            true,
        ),
        Notification::new(
            4,
            NotificationKind::Info,
            "Orientation Day Schedule Published",
            "Check your dashboard for the detailed orientation schedule.",
            "2 days ago",
            true,
        ),
        Notification::new(
            5,
            NotificationKind::Deadline,
            "Hostel Preference Deadline",
            "Submit your hostel room preference by Feb 27.",
            "2 days ago",
            true,
        ),
    ];
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    return notifications.iter().filter(|n| return !n.read).count();
}
