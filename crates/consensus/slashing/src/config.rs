#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashingConfig {
    pub history_window: u64,
    pub max_pool_entries: usize,
}

impl Default for SlashingConfig {
    fn default() -> Self {
        Self { history_window: 256, max_pool_entries: 1024 }
    }
}
