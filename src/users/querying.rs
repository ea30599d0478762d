use tracing::warn;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: i64,
    pub page_size: i64,
    pub reverse: bool,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            reverse: false,
        }
    }
}

impl PaginationParams {
    /// Builds pagination from raw request values. Out of range values fall back
    /// to defaults with a warning rather than failing the request.
    pub fn new(page: i64, page_size: i64, reverse: bool) -> Self {
        let page = if page < 0 {
            warn!(page, "page must be positive 0, default to 0");
            0
        } else {
            page
        };
        let page_size = if page_size <= 0 {
            warn!(
                page_size,
                "page_size must be greater than 0, default to {}", DEFAULT_PAGE_SIZE
            );
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            page,
            page_size,
            reverse,
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortParams {
    pub sort_by: String,
    pub sort_order: String,
}

impl SortParams {
    pub fn new(sort_by: Option<String>, sort_order: Option<String>) -> Self {
        Self {
            sort_by: sort_by.unwrap_or_default(),
            sort_order: sort_order.unwrap_or_default(),
        }
    }

    /// A sort order is only checked when a sort field is present too.
    pub fn has_valid_order(&self) -> bool {
        if self.sort_by.is_empty() || self.sort_order.is_empty() {
            return true;
        }
        SortOrder::parse(&self.sort_order).is_some()
    }

    /// Direction used by backends: anything other than an exact `desc` sorts ascending.
    pub fn direction(&self) -> SortOrder {
        SortOrder::parse(&self.sort_order).unwrap_or(SortOrder::Asc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Username,
    Email,
    Phone,
    Avatar,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "username" => Some(SortField::Username),
            "email" => Some(SortField::Email),
            "phone" => Some(SortField::Phone),
            "avatar" => Some(SortField::Avatar),
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::Avatar => "avatar",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}
