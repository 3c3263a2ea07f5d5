use crate::domain::Field;

/// Kinds of listable content, used to pick columns for visibility filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Representative,
    Convention,
    Event,
    News,
}

impl ContentKind {
    /// Whether items of this kind carry a free-text department.
    pub fn has_department(&self) -> bool {
        matches!(self, ContentKind::Representative)
    }

    /// Whether items of this kind carry a category and an electoral list.
    pub fn has_category(&self) -> bool {
        matches!(self, ContentKind::Representative)
    }

    /// Field used for display ordering and free-text search.
    pub fn label_field(&self) -> Field {
        match self {
            ContentKind::Representative | ContentKind::Convention => Field::Name,
            ContentKind::Event | ContentKind::News => Field::Title,
        }
    }

    /// Extra fields searched by the free-text query besides the label.
    pub fn search_fields(&self) -> &'static [Field] {
        match self {
            ContentKind::Representative => &[Field::Surname, Field::Department],
            ContentKind::Convention | ContentKind::Event | ContentKind::News => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Representative => "representative",
            ContentKind::Convention => "convention",
            ContentKind::Event => "event",
            ContentKind::News => "news",
        }
    }
}
