use crate::record::EmployeeRecord;

pub const ZOOM_MIN_PERCENT: u32 = 50;
pub const ZOOM_MAX_PERCENT: u32 = 150;
pub const ZOOM_STEP_PERCENT: u32 = 10;
pub const ZOOM_DEFAULT_PERCENT: u32 = 80;

/// Chart zoom, kept in whole percent so repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    percent: u32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { percent: ZOOM_DEFAULT_PERCENT }
    }
}

impl Zoom {
    pub fn new(percent: u32) -> Self {
        Self { percent: percent.clamp(ZOOM_MIN_PERCENT, ZOOM_MAX_PERCENT) }
    }

    pub fn zoom_in(&mut self) {
        *self = Self::new(self.percent + ZOOM_STEP_PERCENT);
    }

    pub fn zoom_out(&mut self) {
        *self = Self::new(self.percent.saturating_sub(ZOOM_STEP_PERCENT));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }

    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// Badge under a card. Nothing for people without reports.
pub fn reports_badge(direct_reports: usize) -> Option<String> {
    match direct_reports {
        0 => None,
        1 => Some("1 Report".to_string()),
        n => Some(format!("{} Reports", n)),
    }
}

/// Placeholder letter for a card without a photo.
pub fn avatar_letter(name: &str) -> Option<char> {
    name.chars().next().and_then(|c| c.to_uppercase().next())
}

/// Up to two initials, as shown in search results without a photo.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

pub fn hierarchy_path(employee: &EmployeeRecord) -> &str {
    match employee.department.as_deref() {
        Some(department) if !department.is_empty() => department,
        _ => "Organization",
    }
}
