/// A blocking message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
}

/// Pending alerts with monotonic ID assignment.
///
/// Presentation (modal dialog, stderr line) is up to the front-end, which
/// removes an alert once it has been shown.
#[derive(Debug, Clone, Default)]
pub struct AlertQueue {
    alerts: Vec<Alert>,
    next_id: u64,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an alert and return its ID.
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.alerts.push(Alert {
            id,
            message: message.into(),
        });
        id
    }

    /// Remove and return every pending alert, oldest first.
    pub fn drain(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
