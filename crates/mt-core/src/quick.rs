//! One-tap session presets.

use crate::activity::ActivityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickActivity {
    pub title: &'static str,
    pub description: &'static str,
    pub activity_type: ActivityType,
}

pub static PRESETS: [QuickActivity; 8] = [
    QuickActivity {
        title: "Music",
        description: "Listening to music or podcasts",
        activity_type: ActivityType::Consuming,
    },
    QuickActivity {
        title: "Social Media",
        description: "Browsing social media platforms",
        activity_type: ActivityType::Consuming,
    },
    QuickActivity {
        title: "Games",
        description: "Playing video or mobile games",
        activity_type: ActivityType::Consuming,
    },
    QuickActivity {
        title: "Code",
        description: "Programming or software development",
        activity_type: ActivityType::Creating,
    },
    QuickActivity {
        title: "Write",
        description: "Writing articles, blogs, or creative content",
        activity_type: ActivityType::Creating,
    },
    QuickActivity {
        title: "Design",
        description: "Graphic design or creative work",
        activity_type: ActivityType::Creating,
    },
    QuickActivity {
        title: "Learn",
        description: "Educational content or courses",
        activity_type: ActivityType::Consuming,
    },
    QuickActivity {
        title: "Watch Youtube",
        description: "Watching television or streaming content",
        activity_type: ActivityType::Consuming,
    },
];

/// Finds a preset by title, ignoring case and surrounding whitespace.
pub fn find(title: &str) -> Option<&'static QuickActivity> {
    let title = title.trim();
    PRESETS.iter().find(|p| p.title.eq_ignore_ascii_case(title))
}
