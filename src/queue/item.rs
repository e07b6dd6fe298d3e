use crate::filter::Category;

/// How an item was discovered, which decides how it is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOrigin {
    /// A post found through search; answered with a reply to its id
    Post,

    /// A trending topic; answered with a standalone post about it
    Trend,
}

/// A raw item returned by a fetch gateway, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedItem {
    pub id: String,
    pub text: String,
    pub origin: ItemOrigin,
}

impl FetchedItem {
    pub fn post(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            origin: ItemOrigin::Post,
        }
    }

    /// A trend is identified by its own name
    pub fn trend(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            text: name,
            origin: ItemOrigin::Trend,
        }
    }
}

/// An accepted item waiting to be published
///
/// The category is assigned once at enqueue time and never re-evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    id: String,
    text: String,
    category: Category,
    origin: ItemOrigin,
}

impl CandidateItem {
    pub fn new(fetched: FetchedItem, category: Category) -> Self {
        Self {
            id: fetched.id,
            text: fetched.text,
            category,
            origin: fetched.origin,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn origin(&self) -> ItemOrigin {
        self.origin
    }

    /// The id to reply to, or `None` for standalone posts
    pub fn reply_target(&self) -> Option<&str> {
        match self.origin {
            ItemOrigin::Post => Some(&self.id),
            ItemOrigin::Trend => None,
        }
    }
}
