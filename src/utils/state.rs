use chrono::NaiveDate;

/// In-memory state of the bot. Nothing here survives a restart.
#[derive(Debug, Clone, Default)]
pub struct BotState {
    /// Intentions collected since the last purge, in submission order
    intentions: Vec<String>,

    /// Last calendar day on which the digest was broadcast
    last_digest_day: Option<NaiveDate>,
}

impl BotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an intention. Only the text is kept, never who sent it.
    pub fn add_intention(&mut self, text: String) {
        self.intentions.push(text);
    }

    pub fn intentions(&self) -> &[String] {
        &self.intentions
    }

    pub fn is_empty(&self) -> bool {
        self.intentions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intentions.len()
    }

    /// Drop every collected intention. The digest marker is left alone.
    pub fn clear(&mut self) {
        self.intentions.clear();
    }

    pub fn digest_sent_on(&self, day: NaiveDate) -> bool {
        self.last_digest_day == Some(day)
    }

    pub fn mark_digest_sent(&mut self, day: NaiveDate) {
        self.last_digest_day = Some(day);
    }
}
