//! Built-in option catalogs for the session form.
//!
//! Catalogs are plain ordered data owned by the caller; the select engine
//! only ever borrows them.

use ratatui::style::Color;

use crate::select::Choice;

/// An interview mode with its card copy and accent color.
#[derive(Debug, Clone)]
pub struct ModeSpec {
    pub id: String,
    pub label: String,
    pub description: String,
    pub color: Color,
}

impl ModeSpec {
    fn new(id: &str, label: &str, description: &str, color: Color) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            color,
        }
    }
}

/// The full set of catalogs the form draws from.
pub struct Catalogs {
    pub roles: Vec<Choice>,
    pub stacks: Vec<Choice>,
    pub levels: Vec<Choice>,
    pub modes: Vec<ModeSpec>,
}

impl Catalogs {
    pub fn builtin() -> Self {
        Self {
            roles: vec![
                Choice::new("frontend", "Frontend Developer"),
                Choice::new("backend", "Backend Developer"),
                Choice::new("fullstack", "Full-Stack Developer"),
                Choice::new("mobile", "Mobile Developer"),
                Choice::new("devops", "DevOps Engineer"),
                Choice::new("data", "Data Engineer"),
                Choice::new("qa", "QA Engineer"),
                Choice::new("security", "Security Engineer"),
            ],
            stacks: vec![
                Choice::new("react", "React"),
                Choice::new("vue", "Vue"),
                Choice::new("angular", "Angular"),
                Choice::new("node", "Node.js"),
                Choice::new("python", "Python"),
                Choice::new("java", "Java"),
                Choice::new("go", "Go"),
                Choice::new("rust", "Rust"),
            ],
            levels: vec![
                Choice::new("intern", "Intern"),
                Choice::new("junior", "Junior"),
                Choice::new("mid", "Mid-Level"),
                Choice::new("senior", "Senior"),
                Choice::new("staff", "Staff"),
            ],
            modes: vec![
                ModeSpec::new(
                    "practice",
                    "Practice",
                    "Relaxed pace with hints and explanations",
                    Color::Green,
                ),
                ModeSpec::new(
                    "simulation",
                    "Simulation",
                    "Timed, realistic interview with no assistance",
                    Color::Yellow,
                ),
                ModeSpec::new(
                    "drill",
                    "Drill",
                    "Rapid-fire questions on fundamentals",
                    Color::Magenta,
                ),
            ],
        }
    }

    /// Label for a role/stack/level id, falling back to the raw id when the
    /// catalog no longer carries it.
    pub fn label_for<'a>(catalog: &'a [Choice], id: &'a str) -> &'a str {
        catalog
            .iter()
            .find(|choice| choice.id == id)
            .map(|choice| choice.label.as_str())
            .unwrap_or(id)
    }
}
