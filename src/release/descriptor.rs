use serde::Serialize;

/// Immutable identity and policy of a cataloged application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDescriptor {
    pub id: String,
    pub display_name: String,
    pub package_name: String,
    /// `None` disables the per-app staleness check and the global ceiling
    pub max_age_days: Option<u32>,
    /// Version texts that skip the per-app threshold (the global ceiling still applies)
    pub age_check_exemptions: Vec<String>,
    pub requires_min_os: bool,
}

impl ApplicationDescriptor {
    pub fn new(id: &str, display_name: &str, package_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            package_name: package_name.to_string(),
            max_age_days: None,
            age_check_exemptions: Vec::new(),
            requires_min_os: true,
        }
    }

    pub fn max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = Some(days);
        self
    }

    pub fn exempt_version(mut self, version_text: &str) -> Self {
        self.age_check_exemptions.push(version_text.to_string());
        self
    }

    pub fn without_min_os(mut self) -> Self {
        self.requires_min_os = false;
        self
    }

    pub fn is_exempt(&self, version_text: &str) -> bool {
        self.age_check_exemptions.iter().any(|v| v == version_text)
    }
}
