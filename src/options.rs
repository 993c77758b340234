use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0";

#[derive(Debug, Clone)]
pub struct Options {
    pub user_agent: String,
    /// directory holding the intermediate `<clip_id>.m4v` / `<clip_id>.m4a` files
    pub work_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            work_dir: PathBuf::from("."),
        }
    }
}
