/// Processing stages of a single item
///
/// An item moves strictly forward through these stages. Any non-terminal
/// stage may also jump straight to `Done` when a step fails.
use std::fmt;

/// Represents where an item is in its processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStage {
    /// Fetching the item's detail page
    FetchDetail,

    /// Extracting the story link and comment links from the detail page
    Parse,

    /// Fetching the article and comment links concurrently
    FetchLinked,

    /// Writing the detail page, article and comments to disk
    Persist,

    /// Processing finished, successfully or not
    Done,
}

impl ItemStage {
    /// Returns true if no further processing happens after this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the stage that follows this one on the success path
    pub fn next(&self) -> Self {
        match self {
            Self::FetchDetail => Self::Parse,
            Self::Parse => Self::FetchLinked,
            Self::FetchLinked => Self::Persist,
            Self::Persist | Self::Done => Self::Done,
        }
    }

    /// Returns true if moving from this stage to `to` is allowed
    pub fn can_transition_to(&self, to: ItemStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Done || to == self.next()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchDetail => "fetch_detail",
            Self::Parse => "parse",
            Self::FetchLinked => "fetch_linked",
            Self::Persist => "persist",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
