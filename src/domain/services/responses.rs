#[cfg(test)]
#[path = "responses_test.rs"]
mod tests;

/// Prompts offered to the user before they type anything.
pub const QUICK_PROMPTS: [&str; 4] = [
    "What documents do I need to upload?",
    "How do I pay my semester fees?",
    "When is the hostel allocation deadline?",
    "Help me with course registration",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Topic {
    Documents,
    Fees,
    Hostel,
    Course,
    Default,
}

// Checked in order, first hit wins.
static KEYWORD_SETS: &[(Topic, &[&str])] = &[
    (Topic::Documents, &["document", "upload"]),
    (Topic::Fees, &["fee", "pay"]),
    (Topic::Hostel, &["hostel", "room"]),
    (Topic::Course, &["course", "registration", "elective"]),
];

impl Topic {
    pub fn response(&self) -> &'static str {
        match self {
            Topic::Default => {
                return "I'm your CampusFlow AI assistant! I can help with document verification, fee payments, course registration, hostel allocation, and more. What would you like to know?";
            }
            Topic::Documents => {
                return "📄 **Documents Required for Verification:**\n\n1. **10th Marksheet** – Scanned copy (PDF)\n2. **12th Marksheet** – Scanned copy (PDF)\n3. **Entrance Exam Scorecard** – JEE/State CET\n4. **Aadhar Card** – Front & back\n5. **Transfer Certificate** – Original scan\n6. **Passport-size Photos** (4 copies)\n\n✅ You've uploaded 4/6 documents. **Transfer Certificate** and **Photos** are still pending.\n\nWould you like me to guide you through the upload process?";
            }
            Topic::Fees => {
                return "💳 **Fee Payment Status:**\n\n| Component | Amount | Status |\n|-----------|--------|--------|\n| Tuition Fee | ₹1,25,000 | ✅ Paid |\n| Hostel Fee | ₹45,000 | ⏳ Pending |\n| Exam Fee | ₹5,000 | ⏳ Pending |\n\n**Total Pending:** ₹50,000\n**Deadline:** February 25, 2025\n\nYou can pay via UPI, Net Banking, or Credit Card through the payment portal. Shall I take you there?";
            }
            Topic::Hostel => {
                return "🏠 **Hostel Allocation Update:**\n\nYour hostel preference has been recorded:\n- **1st Preference:** Block A (AC, Double Sharing)\n- **2nd Preference:** Block C (Non-AC, Triple)\n\n📅 **Allocation Date:** February 28, 2025\n\nBased on your admission rank (#142), you have a **high probability** of getting your 1st preference. I'll notify you as soon as the allocation is finalized!";
            }
            Topic::Course => {
                return "📚 **Course Registration Guide:**\n\n**Mandatory Courses (auto-enrolled):**\n- Engineering Mathematics I\n- Engineering Physics\n- Programming in C\n- Engineering Drawing\n\n**Electives (choose 1):**\n- 🔬 Environmental Science\n- 🌐 Introduction to Web Technologies\n- 🤖 Basics of AI & ML\n\n**Lab Sections:** Choose your preferred slot in the registration portal.\n\n⏰ **Deadline:** February 22, 2025 (2 days left!)\n\nShall I help you pick an elective based on your interests?";
            }
        }
    }
}

/// Plain substring matching on the lower-cased input, so "discourse" counts
/// as a course question.
pub fn select_topic(input: &str) -> Topic {
    let lower = input.to_lowercase();

    return KEYWORD_SETS
        .iter()
        .find(|(_, keywords)| {
            return keywords.iter().any(|keyword| return lower.contains(*keyword));
        })
        .map(|(topic, _)| return *topic)
        .unwrap_or(Topic::Default);
}

pub fn select_response(input: &str) -> &'static str {
    return select_topic(input).response();
}
