use crate::error::ForkviewError;
use crate::types::{ForkPage, SortMode};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,

    // Row movement; spills over to the neighbouring page at the table edges
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,

    // Paging
    NextPage,
    PrevPage,
    Sort(SortMode),

    // Fetch completion, tagged with the request it answers
    ForksLoaded {
        request: u64,
        page: usize,
        result: ForkPage,
    },

    OpenInBrowser,
    YankUrl,

    /// Unrecoverable failure; ends the session.
    Fatal(String),
    None,
}

impl From<ForkviewError> for Action {
    fn from(err: ForkviewError) -> Self {
        Action::Fatal(err.to_string())
    }
}
